use cycler::platform::{CommandOutput, CommandRunner};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Runner that answers from canned stdout per program and records calls
#[derive(Default)]
pub struct CannedRunner {
    outputs: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl CannedRunner {
    pub fn with(mut self, program: &str, stdout: &str) -> Self {
        self.outputs.insert(program.to_string(), stdout.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for CannedRunner {
    fn run(&self, program: &str, args: &[&str], _timeout: Duration) -> Option<CommandOutput> {
        let mut call = program.to_string();
        for arg in args {
            call.push(' ');
            call.push_str(arg);
        }
        self.calls.lock().unwrap().push(call);

        self.outputs.get(program).map(|stdout| CommandOutput {
            success: true,
            stdout: stdout.clone(),
            stderr: String::new(),
        })
    }
}

pub const PMSET_CHARGING: &str =
    "Now drawing from 'AC Power'\n -InternalBattery-0 (id=4653155)\t81%; charging; 0:41 remaining present: true\n";

pub const PROFILER: &str = "Power:\n\n    Battery Information:\n\n      Health Information:\n          Cycle Count: 230\n          Condition: Normal\n          Maximum Capacity: 90%\n";

pub const IOREG: &str = "+-o AppleSmartBattery  <class AppleSmartBattery>\n    {\n      \"NominalChargeCapacity\" = 4000\n      \"DesignCapacity\" = 5000\n    }\n";
