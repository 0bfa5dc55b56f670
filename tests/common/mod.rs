use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::Mutex;

/// Serializes every in-process test in this binary. `error` tracks its
/// state in process-wide statics (see `loxi::error`), so two `is OK`
/// tests running on separate threads at once could see each other's
/// diagnostics. Integration test binaries run one per file, but within
/// a file `cargo test` runs functions concurrently by default.
pub static LOCK: Mutex<()> = Mutex::new(());

/// An in-memory `Write` sink a test can read back after the run. Lets
/// `is OK` fixtures capture `print` output without going through a
/// subprocess.
#[derive(Clone, Default)]
pub struct CaptureBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for CaptureBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl CaptureBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("script output to be valid utf-8")
    }
}

/// Declares one test per fixture. `is OK` runs the fixture in-process
/// and compares captured stdout line by line; `is ERR` shells out to
/// the built binary (via `assert_cmd`) and checks that every given
/// fragment appears somewhere in stderr, plus a non-zero exit status.
/// Fragments, not full lines, because line:column positions shift
/// whenever a fixture is edited and aren't worth pinning exactly.
#[macro_export]
macro_rules! tests {
    ($file:ident in $scope:ident is OK $($expected:expr)*) => {
        #[test]
        fn $file() {
            let _guard = $crate::common::LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
            loxi::error::reset();

            let mut expected = vec![$($expected),*];
            let expected = match expected.len() {
                0 => String::new(),
                _ => {
                    expected.push("");
                    expected.join("\n")
                }
            };

            let path = format!("tests/fixtures/{}/{}.lox", stringify!($scope), stringify!($file));
            let buffer = $crate::common::CaptureBuffer::default();
            let mut lox = loxi::Lox::with_output(Box::new(buffer.clone()));
            lox.run_file(&path);

            assert_eq!(expected, buffer.contents());
        }
    };

    ($file:ident in $scope:ident is ERR $($expected:expr)+) => {
        #[test]
        fn $file() {
            use assert_cmd::Command;
            use predicates::prelude::*;

            let path = format!("tests/fixtures/{}/{}.lox", stringify!($scope), stringify!($file));
            let mut assert = Command::cargo_bin("loxi").unwrap().arg(path).assert().failure();

            $(
                assert = assert.stderr(predicate::str::contains($expected));
            )+

            let _ = assert;
        }
    };
}
