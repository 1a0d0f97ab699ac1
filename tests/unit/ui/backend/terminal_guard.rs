use super::*;
use std::sync::Mutex;

#[derive(Default)]
struct MockOps {
    calls: Mutex<Vec<&'static str>>,
}

impl TerminalOps for MockOps {
    fn setup(&self) -> io::Result<()> {
        self.calls.lock().unwrap().push("setup");
        Ok(())
    }

    fn restore(&self) -> io::Result<()> {
        self.calls.lock().unwrap().push("restore");
        Ok(())
    }
}

#[test]
fn terminal_mode_restores_on_drop() {
    let ops = Arc::new(MockOps::default());
    {
        let _mode = TerminalMode::with_ops(ops.clone()).unwrap();
    }
    assert_eq!(&*ops.calls.lock().unwrap(), &["setup", "restore"]);
}

#[test]
fn restorer_is_idempotent_across_clones() {
    let ops = Arc::new(MockOps::default());
    let mode = TerminalMode::with_ops(ops.clone()).unwrap();
    let restorer = mode.restorer();

    restorer.restore().unwrap();
    restorer.restore().unwrap();
    drop(mode);

    assert_eq!(&*ops.calls.lock().unwrap(), &["setup", "restore"]);
}

#[test]
fn leave_then_enter_rearms_restore() {
    let ops = Arc::new(MockOps::default());
    let mode = TerminalMode::with_ops(ops.clone()).unwrap();
    mode.leave().unwrap();
    assert!(!mode.restorer().is_active());
    mode.enter().unwrap();
    mode.enter().unwrap();
    drop(mode);

    assert_eq!(
        &*ops.calls.lock().unwrap(),
        &["setup", "restore", "setup", "restore"]
    );
}
