use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;

use rust_text_editor::ansi_escape::{CLEAR_SCREEN, MOVE_CURSOR_TO_START};
use rust_text_editor::{Controller, Error};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            die(&err);
            ExitCode::FAILURE
        }
    }
}

/// Reset the screen (clear + home the cursor) before reporting a fatal error, so the error does
/// not land in the middle of whatever the editor had drawn on screen.
fn die(err: &Error) {
    let mut stdout = std::io::stdout();
    let _ = stdout.write_all(CLEAR_SCREEN.as_bytes());
    let _ = stdout.write_all(MOVE_CURSOR_TO_START.as_bytes());
    let _ = stdout.flush();
    eprintln!("editor: {err}");
}

fn run() -> Result<(), Error> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() > 1 {
        return Err(Error::TooManyArguments(args.len() + 1));
    }
    let path = args.into_iter().next().map(PathBuf::from);

    let mut controller = Controller::new(path)?;
    controller.run()
}
