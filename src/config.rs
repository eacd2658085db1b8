//! Client configuration, following the builder-pattern idiom of
//! `gix-upload-pack::config::ServerOptions`: a plain struct with `with_*`
//! setters and a sensible `Default`.

use std::time::Duration;

use crate::capabilities::CapabilitySet;

/// Fixed window/depth parameters a caller's pack generator is expected to
/// honor for push, matching the Push Driver's `packer(window, depth,
/// ofs_delta, ...)` call.
#[derive(Debug, Clone, Copy)]
pub struct PackGeneratorTuning {
    pub window: u32,
    pub depth: u32,
    pub ofs_delta: bool,
}

impl Default for PackGeneratorTuning {
    fn default() -> Self {
        Self { window: 10, depth: 50, ofs_delta: true }
    }
}

/// Client-side configuration for a Smart HTTP session.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    agent: String,
    capabilities: CapabilitySet,
    timeout: Option<Duration>,
    extra_headers: Vec<(String, String)>,
    pack_generator: PackGeneratorTuning,
}

impl Default for ClientOptions {
    fn default() -> Self {
        let agent = format!("git/gix-smart-http-{}", env!("CARGO_PKG_VERSION"));
        Self {
            capabilities: CapabilitySet::modern_client_defaults(agent.clone()),
            agent,
            timeout: None,
            extra_headers: Vec::new(),
            pack_generator: PackGeneratorTuning::default(),
        }
    }
}

impl ClientOptions {
    /// Default configuration: modern capability set, no timeout, no extra
    /// headers, window=10/depth=50 pack generator tuning.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the agent string (also replaces the `Agent` entry in
    /// `capabilities` if one is already present).
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        let agent = agent.into();
        self.capabilities = CapabilitySet::modern_client_defaults(agent.clone());
        self.agent = agent;
        self
    }

    /// Replace the advertised client capability set entirely.
    pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set a request timeout, interpreted by the `HttpClient` collaborator.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Append a header sent with every request, subject to the header
    /// builder's no-override-of-required-headers rule.
    pub fn with_extra_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    /// Override the push-side pack generator tuning.
    pub fn with_pack_generator_tuning(mut self, tuning: PackGeneratorTuning) -> Self {
        self.pack_generator = tuning;
        self
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn capabilities(&self) -> &CapabilitySet {
        &self.capabilities
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn extra_headers(&self) -> &[(String, String)] {
        &self.extra_headers
    }

    pub fn pack_generator(&self) -> PackGeneratorTuning {
        self.pack_generator
    }
}
