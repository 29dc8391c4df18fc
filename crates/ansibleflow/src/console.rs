use ansibleflow_executor::{LogLevel, LogSink};
use colored::Colorize;

/// ステージ出力をターミナルに書き出すシンク
pub struct ConsoleLogSink {
    stderr_only: bool,
}

impl ConsoleLogSink {
    pub fn new(stderr_only: bool) -> Self {
        Self { stderr_only }
    }
}

impl LogSink for ConsoleLogSink {
    fn write(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Info if self.stderr_only => eprintln!("{}", message),
            LogLevel::Info => println!("{}", message),
            LogLevel::Error => eprintln!("{}", message.red()),
        }
    }
}
