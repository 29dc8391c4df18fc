use ansibleflow_executor::{AnsiblePlugin, StagePlugin};

pub fn handle() {
    for stage in AnsiblePlugin::new().fetch_defined_stages() {
        println!("{}", stage);
    }
}
