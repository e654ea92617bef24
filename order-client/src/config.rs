//! Client configuration

use crate::error::MessageError;
use crate::message::MessageClientConfig;
use crate::message::tls::client_config_from_pem;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// How notification values that fail to encode are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlobEncoding {
    /// Substitute an empty blob, log a warning and keep going
    #[default]
    Lenient,
    /// Abort the whole call before anything is sent
    Strict,
}

impl FromStr for BlobEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown blob encoding: {other}")),
        }
    }
}

/// Adapter behaviour switches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdapterConfig {
    /// Notification value encoding policy
    pub blob_encoding: BlobEncoding,
    /// Run CreateOrder on a task the caller's cancellation cannot reach
    pub detach_create: bool,
}

impl AdapterConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the notification encoding policy
    pub fn with_blob_encoding(mut self, encoding: BlobEncoding) -> Self {
        self.blob_encoding = encoding;
        self
    }

    /// Detach CreateOrder from caller cancellation
    pub fn with_detach_create(mut self, detach: bool) -> Self {
        self.detach_create = detach;
        self
    }
}

/// Client configuration for connecting to the order service
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | ORDER_SERVICE_ADDR | 127.0.0.1:9090 | 订单服务消息总线地址 |
/// | ORDER_CLIENT_NAME | order-client | 握手时上报的客户端名称 |
/// | ORDER_TLS_DOMAIN | (未设置) | TLS 服务器名称，未设置则使用明文 TCP |
/// | ORDER_TLS_CA_PEM | (未设置) | 校验订单服务证书的 CA 文件 (PEM)，设置即启用 TLS |
/// | ORDER_REQUEST_TIMEOUT_MS | 3000 | 单次调用/单次流接收超时(毫秒) |
/// | ORDER_BLOB_ENCODING | lenient | lenient \| strict |
/// | ORDER_DETACH_CREATE | false | CreateOrder 是否脱离调用方取消 |
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Message bus address (e.g., "127.0.0.1:9090")
    pub addr: String,

    /// Client name sent in the handshake
    pub client_name: String,

    /// TLS server name; `None` means plain TCP
    pub tls_domain: Option<String>,

    /// CA bundle (PEM file) that verifies the order service
    pub tls_ca_pem: Option<PathBuf>,

    /// Message client settings
    pub message: MessageClientConfig,

    /// Adapter settings
    pub adapter: AdapterConfig,
}

impl ClientConfig {
    /// Create a new client configuration with defaults for everything but the address
    pub fn new(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            client_name: "order-client".to_string(),
            tls_domain: None,
            tls_ca_pem: None,
            message: MessageClientConfig::default(),
            adapter: AdapterConfig::default(),
        }
    }

    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::new(
            lookup("ORDER_SERVICE_ADDR").unwrap_or_else(|| "127.0.0.1:9090".into()),
        );

        if let Some(name) = lookup("ORDER_CLIENT_NAME") {
            config.client_name = name;
        }
        config.tls_domain = lookup("ORDER_TLS_DOMAIN").filter(|d| !d.is_empty());
        config.tls_ca_pem = lookup("ORDER_TLS_CA_PEM")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);

        if let Some(ms) = lookup("ORDER_REQUEST_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            config.message.request_timeout = Duration::from_millis(ms);
        }
        if let Some(encoding) = lookup("ORDER_BLOB_ENCODING").and_then(|v| v.parse().ok()) {
            config.adapter.blob_encoding = encoding;
        }
        if let Some(detach) = lookup("ORDER_DETACH_CREATE").and_then(|v| v.parse().ok()) {
            config.adapter.detach_create = detach;
        }

        config
    }

    /// Set the client name
    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    /// Use TLS with the given server name
    pub fn with_tls_domain(mut self, domain: impl Into<String>) -> Self {
        self.tls_domain = Some(domain.into());
        self
    }

    /// Verify the server against the CA bundle at `path`
    pub fn with_tls_ca_pem(mut self, path: impl Into<PathBuf>) -> Self {
        self.tls_ca_pem = Some(path.into());
        self
    }

    /// Build the rustls configuration for [`BusOrderChannel::connect`](crate::BusOrderChannel::connect)
    ///
    /// `Ok(None)` means plain TCP. A TLS domain without a CA bundle is an
    /// error, as is a bundle that cannot be read or holds no certificate.
    pub fn tls_client_config(&self) -> Result<Option<rustls::ClientConfig>, MessageError> {
        let Some(path) = &self.tls_ca_pem else {
            if self.tls_domain.is_some() {
                return Err(MessageError::Tls(
                    "TLS domain configured but no CA bundle (ORDER_TLS_CA_PEM)".to_string(),
                ));
            }
            return Ok(None);
        };

        let ca_pem = std::fs::read(path).map_err(|e| {
            MessageError::Tls(format!("Failed to read CA bundle {}: {}", path.display(), e))
        })?;
        client_config_from_pem(&ca_pem, None).map(Some)
    }

    /// Set the message client configuration
    pub fn with_message_config(mut self, message: MessageClientConfig) -> Self {
        self.message = message;
        self
    }

    /// Set the adapter configuration
    pub fn with_adapter_config(mut self, adapter: AdapterConfig) -> Self {
        self.adapter = adapter;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("127.0.0.1:9090")
    }
}
