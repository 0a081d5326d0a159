//! Layered retrieval of the published spreadsheet.
//!
//! Transports are tried in a fixed priority order; the first non-empty
//! payload wins. The final tier disables TLS verification and exists only
//! for sandboxed CI hosts whose trust stores cannot see the sheet host;
//! outcomes from it are flagged so callers can warn.

use crate::USER_AGENT;
use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

const MAX_REDIRECTS: usize = 5;
const CURL_RETRIES: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    /// reqwest with TLS verification and a 2xx status requirement.
    NativeSecure,
    /// reqwest again, but any status with a non-empty body is accepted.
    NativeLenient,
    /// `curl` from PATH, TLS verification on.
    ExternalCurl,
    /// `curl -k`. Last resort; explicit trust downgrade.
    ExternalCurlInsecure,
}

/// Priority order. Each tier runs only after every prior tier produced an
/// empty or error result.
pub const TRANSPORT_ORDER: &[Transport] = &[
    Transport::NativeSecure,
    Transport::NativeLenient,
    Transport::ExternalCurl,
    Transport::ExternalCurlInsecure,
];

impl Transport {
    pub fn as_str(self) -> &'static str {
        match self {
            Transport::NativeSecure => "native-secure",
            Transport::NativeLenient => "native-lenient",
            Transport::ExternalCurl => "external-curl",
            Transport::ExternalCurlInsecure => "external-curl-insecure",
        }
    }

    pub fn is_external(self) -> bool {
        matches!(
            self,
            Transport::ExternalCurl | Transport::ExternalCurlInsecure
        )
    }

    /// True when the transport bypasses TLS verification.
    pub fn is_degraded(self) -> bool {
        matches!(self, Transport::ExternalCurlInsecure)
    }
}

/// Payload plus the transport that produced it.
#[derive(Debug)]
pub struct FetchOutcome {
    pub body: String,
    pub transport: Transport,
}

impl FetchOutcome {
    pub fn degraded(&self) -> bool {
        self.transport.is_degraded()
    }
}

/// Fetch the spreadsheet, walking the transport tiers in order.
///
/// Exhausting every tier is fatal; the error lists what each tier reported.
pub fn fetch_catalog(url: &str, timeout: Duration) -> Result<FetchOutcome> {
    let curl = curl_on_path();
    let mut failures: Vec<String> = Vec::new();

    for &transport in TRANSPORT_ORDER {
        let attempt = match (transport, curl.as_deref()) {
            (Transport::NativeSecure, _) => fetch_native(url, timeout, true),
            (Transport::NativeLenient, _) => fetch_native(url, timeout, false),
            (Transport::ExternalCurl | Transport::ExternalCurlInsecure, Some(curl)) => {
                fetch_curl(curl, url, timeout, transport.is_degraded())
            }
            (Transport::ExternalCurl | Transport::ExternalCurlInsecure, None) => {
                failures.push(format!("{}: curl not on PATH", transport.as_str()));
                continue;
            }
        };

        match attempt {
            Ok(body) if !body.is_empty() => return Ok(FetchOutcome { body, transport }),
            Ok(_) => failures.push(format!("{}: empty body", transport.as_str())),
            Err(err) => failures.push(format!("{}: {err:#}", transport.as_str())),
        }
    }

    bail!(
        "Failed to fetch CSV from {url}; all transports exhausted ({})",
        failures.join("; ")
    );
}

fn fetch_native(url: &str, timeout: Duration, strict_status: bool) -> Result<String> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .connect_timeout(timeout)
        .timeout(timeout)
        .build()
        .context("building HTTP client")?;

    let response = client
        .get(url)
        .send()
        .with_context(|| format!("requesting {url}"))?;

    let status = response.status();
    if strict_status && !status.is_success() {
        bail!("unexpected status {status}");
    }

    response.text().context("reading response body")
}

fn fetch_curl(curl: &Path, url: &str, timeout: Duration, insecure: bool) -> Result<String> {
    let args = curl_args(url, timeout, insecure);
    let output = Command::new(curl)
        .args(&args)
        .output()
        .with_context(|| format!("spawning {}", curl.display()))?;

    if !output.status.success() {
        bail!(
            "curl exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Argument vector for the external tiers; kept separate so the invocation
/// contract is testable without a network.
fn curl_args(url: &str, timeout: Duration, insecure: bool) -> Vec<OsString> {
    let timeout_secs = timeout.as_secs().max(1).to_string();
    let mut args: Vec<OsString> = vec![
        OsString::from("-fsSL"),
        OsString::from("--max-redirs"),
        OsString::from(MAX_REDIRECTS.to_string()),
        OsString::from("--connect-timeout"),
        OsString::from(&timeout_secs),
        OsString::from("--max-time"),
        OsString::from(&timeout_secs),
        OsString::from("--retry"),
        OsString::from(CURL_RETRIES.to_string()),
        OsString::from("-A"),
        OsString::from(USER_AGENT),
    ];
    if insecure {
        args.push(OsString::from("-k"));
    }
    args.push(OsString::from(url));
    args
}

fn curl_on_path() -> Option<PathBuf> {
    env::var_os("PATH").and_then(|paths| {
        env::split_paths(&paths)
            .map(|dir| dir.join("curl"))
            .find(|candidate| candidate.is_file())
    })
}
