//! Desktop notifications.
//!
//! - Linux: `notify-send` (libnotify)
//! - macOS: `osascript` (AppleScript)
//!
//! Best-effort: a missing binary or a failing helper is only logged. The
//! helper is waited on so it never lingers as a zombie; both helpers return
//! as soon as the notification has been handed to the desktop.

use std::io;
use std::process::{Command, ExitStatus, Stdio};

const APP_NAME: &str = "Glotkey";

/// Show `body` under `title`. `silent` asks the notification server not to
/// play its own sound.
pub fn send(title: &str, body: &str, silent: bool) {
    #[cfg(target_os = "linux")]
    run_helper("notify-send", &notify_send_args(title, body, silent));

    #[cfg(target_os = "macos")]
    run_helper("osascript", &["-e".to_string(), applescript(title, body, silent)]);

    #[cfg(not(any(target_os = "linux", target_os = "macos")))]
    {
        log::debug!("notification: not supported on this platform");
        let _ = (title, body, silent);
    }
}

#[cfg_attr(not(any(target_os = "linux", target_os = "macos")), allow(dead_code))]
fn run_helper(program: &str, args: &[String]) {
    match wait_for(program, args) {
        Ok(status) if !status.success() => {
            log::debug!("notification: {program} exited with {status}");
        }
        Ok(_) => {}
        Err(e) => log::debug!("notification: cannot run {program}: {e}"),
    }
}

/// Run `program` to completion with its output discarded.
#[cfg_attr(not(any(target_os = "linux", target_os = "macos", test)), allow(dead_code))]
fn wait_for(program: &str, args: &[String]) -> io::Result<ExitStatus> {
    Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn notify_send_args(title: &str, body: &str, silent: bool) -> Vec<String> {
    let mut args = vec![
        format!("--app-name={APP_NAME}"),
        "--expire-time=3000".to_string(),
    ];
    if silent {
        args.push("--hint=boolean:suppress-sound:true".to_string());
    }
    args.push(title.to_string());
    args.push(body.to_string());
    args
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn applescript(title: &str, body: &str, silent: bool) -> String {
    let escape = |s: &str| s.replace('\\', "\\\\").replace('"', "\\\"");
    let mut script = format!(
        r#"display notification "{}" with title "{}""#,
        escape(body),
        escape(title)
    );
    if !silent {
        script.push_str(r#" sound name "default""#);
    }
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_send_puts_title_and_body_last() {
        let args = notify_send_args("Glotkey", "Text processed and pasted!", false);
        assert_eq!(args[0], "--app-name=Glotkey");
        assert_eq!(args[args.len() - 2], "Glotkey");
        assert_eq!(args[args.len() - 1], "Text processed and pasted!");
        assert!(!args.iter().any(|a| a.contains("suppress-sound")));
    }

    #[test]
    fn silent_notification_suppresses_sound() {
        let args = notify_send_args("Glotkey", "Processing text...", true);
        assert!(args.contains(&"--hint=boolean:suppress-sound:true".to_string()));

        let script = applescript("Glotkey", "Processing text...", true);
        assert!(!script.contains("sound name"));
    }

    #[test]
    fn applescript_escapes_quotes() {
        let script = applescript(r#"Say "hi""#, r"back\slash", false);
        assert_eq!(
            script,
            r#"display notification "back\\slash" with title "Say \"hi\"" sound name "default""#
        );
    }

    #[cfg(unix)]
    #[test]
    fn helper_is_waited_on() {
        let status = wait_for("sh", &["-c".to_string(), "exit 3".to_string()]).unwrap();
        assert_eq!(status.code(), Some(3));
    }

    #[test]
    fn missing_helper_is_an_error() {
        assert!(wait_for("glotkey-no-such-helper", &[]).is_err());
    }
}
