// UI layer: console output around a single post. The caption preview and
// the final response go to stdout; the spinner and prompt use the terminal.

use crate::api::{HttpResponse, Transport};
use anyhow::Result;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;

/// Print the caption that is about to be posted.
pub fn print_preview(caption: &str) {
    println!("Caption Preview:\n{}\n", caption);
}

/// Ask whether to go ahead. Defaults to "no" so a stray Enter does not post.
pub fn confirm_publish() -> Result<bool> {
    let answer = Confirm::new()
        .with_prompt("Publish this post?")
        .default(false)
        .interact()?;
    Ok(answer)
}

/// Run `f` while a spinner with `message` ticks. The spinner is cleared
/// before returning so log lines and output stay readable.
pub fn with_spinner<T, F>(message: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spin_while(spinner, f)
}

fn spin_while<T, F>(spinner: ProgressBar, f: F) -> T
where
    F: FnOnce() -> T,
{
    spinner.enable_steady_tick(Duration::from_millis(100));
    let out = f();
    spinner.finish_and_clear();
    out
}

/// Shows a spinner for the duration of each request only. The publisher logs
/// failed responses after the request returns, so the spinner never draws
/// over them.
pub struct SpinnerTransport<T> {
    inner: T,
    message: &'static str,
}

impl<T: Transport> SpinnerTransport<T> {
    pub fn new(inner: T, message: &'static str) -> Self {
        SpinnerTransport { inner, message }
    }
}

impl<T: Transport> Transport for SpinnerTransport<T> {
    fn post(&self, url: &Url) -> Result<HttpResponse, reqwest::Error> {
        with_spinner(self.message, || self.inner.post(url))
    }
}

/// Print the publish response.
pub fn print_published(published: &Value) {
    println!("Published: {}", published);
}
