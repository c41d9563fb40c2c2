use std::{
    io,
    process::{Command, Stdio},
    time::Duration,
};

use url::Url;

/// Platform command that hands `url` to the default browser, if there is one.
fn browser_command(url: &Url) -> Option<Command> {
    let (program, leading_args): (&str, &[&str]) = if cfg!(target_os = "macos") {
        ("open", &[])
    } else if cfg!(target_os = "windows") {
        ("rundll32", &["url.dll,FileProtocolHandler"])
    } else if cfg!(unix) {
        ("xdg-open", &[])
    } else {
        return None;
    };

    let mut command = Command::new(program);
    command
        .args(leading_args)
        .arg(url.as_str())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    Some(command)
}

fn open_in_browser(url: &Url) -> io::Result<()> {
    let mut command = browser_command(url).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::Unsupported,
            "no system browser launcher on this platform",
        )
    })?;
    command.spawn().map(|_| ())
}

/// Waits `delay` so the final status line stays visible, then opens the launchpad.
///
/// `launchpad_url` is already restricted to http/https by the configuration layer.
pub(crate) async fn redirect_to_launchpad(launchpad_url: &Url, delay: Duration) -> io::Result<()> {
    tokio::time::sleep(delay).await;
    tracing::info!("opening launchpad {launchpad_url}");
    open_in_browser(launchpad_url)
}
