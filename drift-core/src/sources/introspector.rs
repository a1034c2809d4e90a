use crate::config::IntrospectionConfig;
use crate::constants::introspection::LOCALHOST;
use crate::error::{DriftError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// 读取线上表结构
///
/// 返回的行依次是 DESCRIBE 段和 SHOW INDEX 段（各带表头），
/// 客户端报告的错误行原样保留，由解析器识别。
#[async_trait]
pub trait Introspector: Send + Sync {
    async fn introspect(&self, host: &str, database: &str, table: &str) -> Result<Vec<String>>;
}

/// 拆分后的主机地址
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostAddress {
    pub host: String,
    pub port: Option<String>,
}

impl HostAddress {
    /// 解析 `host` 或 `host:port`，非本机主机追加域名后缀
    pub fn parse(raw: &str, suffix: &str) -> Self {
        let (host, port) = match raw.split_once(':') {
            Some((host, port)) => (host, Some(port.to_string())),
            None => (raw, None),
        };
        let host = if host == LOCALHOST || suffix.is_empty() || host.ends_with(suffix) {
            host.to_string()
        } else {
            format!("{host}{suffix}")
        };
        Self { host, port }
    }
}

/// 调用数据库命令行客户端读取表结构
#[derive(Debug, Clone)]
pub struct CommandIntrospector {
    config: IntrospectionConfig,
}

impl CommandIntrospector {
    /// 创建巡检器，客户端程序必须在 PATH 中
    pub fn new(config: IntrospectionConfig) -> Result<Self> {
        if which::which(&config.client).is_err() {
            return Err(DriftError::custom(format!(
                "数据库客户端 {} 未安装或不在 PATH 中",
                config.client
            )));
        }
        Ok(Self { config })
    }

    /// 组装客户端参数（不含程序名）
    pub fn build_args(&self, host: &str, database: &str, table: &str) -> Vec<String> {
        let address = HostAddress::parse(host, &self.config.host_suffix);
        let mut args = self.config.extra_args.clone();
        args.push("-h".to_string());
        args.push(address.host);
        if let Some(port) = address.port {
            args.push("-P".to_string());
            args.push(port);
        }
        args.push("--batch".to_string());
        args.push("-D".to_string());
        args.push(database.to_string());
        args.push("-e".to_string());
        args.push(format!(
            "DESCRIBE `{table}`; SHOW INDEX FROM `{table}`;",
            table = table.replace('`', "``")
        ));
        args
    }

    async fn run_once(&self, args: &[String]) -> Result<std::process::Output> {
        let child = Command::new(&self.config.client)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.config.timeout(), child).await {
            Ok(output) => output.map_err(|e| {
                DriftError::introspection(format!("无法启动 {}: {}", self.config.client, e))
            }),
            Err(_) => Err(DriftError::Timeout {
                operation: "数据库巡检".to_string(),
                timeout_seconds: self.config.timeout_secs,
            }),
        }
    }
}

#[async_trait]
impl Introspector for CommandIntrospector {
    async fn introspect(&self, host: &str, database: &str, table: &str) -> Result<Vec<String>> {
        let args = self.build_args(host, database, table);
        debug!("执行巡检命令: {} {}", self.config.client, args.join(" "));

        // 超时只重试一次
        let output = match self.run_once(&args).await {
            Err(DriftError::Timeout { .. }) => {
                warn!("⏱️ 巡检 {}:{} 的 {} 超时，重试一次", host, database, table);
                self.run_once(&args).await?
            }
            other => other?,
        };

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);

        if !output.status.success() && stderr.trim().is_empty() {
            return Err(DriftError::introspection(format!(
                "{} 退出码 {:?}",
                self.config.client,
                output.status.code()
            )));
        }

        // 错误输出在前，解析器遇到错误行即判定无数据
        Ok(stderr
            .lines()
            .chain(stdout.lines())
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn introspector(suffix: &str) -> CommandIntrospector {
        CommandIntrospector {
            config: IntrospectionConfig {
                extra_args: vec!["--defaults-file=/etc/drift.cnf".to_string()],
                host_suffix: suffix.to_string(),
                ..IntrospectionConfig::default()
            },
        }
    }

    #[test]
    fn test_host_address() {
        assert_eq!(
            HostAddress::parse("db1001:3311", ".eqiad.wmnet"),
            HostAddress {
                host: "db1001.eqiad.wmnet".to_string(),
                port: Some("3311".to_string())
            }
        );
        assert_eq!(HostAddress::parse("localhost", ".eqiad.wmnet").host, "localhost");
        assert_eq!(HostAddress::parse("db1001", "").host, "db1001");
        assert_eq!(
            HostAddress::parse("db1001.eqiad.wmnet", ".eqiad.wmnet").host,
            "db1001.eqiad.wmnet"
        );
    }

    #[test]
    fn test_build_args() {
        let args = introspector(".eqiad.wmnet").build_args("db1002:3312", "enwiki", "revision");

        assert_eq!(
            args,
            vec![
                "--defaults-file=/etc/drift.cnf",
                "-h",
                "db1002.eqiad.wmnet",
                "-P",
                "3312",
                "--batch",
                "-D",
                "enwiki",
                "-e",
                "DESCRIBE `revision`; SHOW INDEX FROM `revision`;",
            ]
        );
    }

    #[test]
    fn test_build_args_without_port() {
        let args = introspector("").build_args("localhost", "my_wiki", "page");

        assert!(!args.contains(&"-P".to_string()));
        assert_eq!(args[2], "localhost");
    }

    // 用 `sh -c` 模拟数据库客户端，巡检参数成为脚本的位置参数
    #[cfg(unix)]
    fn fake_client(script: &str, timeout_secs: u64) -> CommandIntrospector {
        CommandIntrospector {
            config: IntrospectionConfig {
                client: "sh".to_string(),
                extra_args: vec!["-c".to_string(), script.to_string(), "fake-mysql".to_string()],
                timeout_secs,
                ..IntrospectionConfig::default()
            },
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timeout_is_retried_exactly_once() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let counter = temp_dir.path().join("invocations");
        let script = format!("echo run >> '{}'; exec sleep 5", counter.display());

        let result = fake_client(&script, 1).introspect("localhost", "my_wiki", "page").await;

        let err = result.unwrap_err();
        assert!(matches!(err, DriftError::Timeout { timeout_seconds: 1, .. }));
        assert!(err.is_transient());
        let invocations = std::fs::read_to_string(&counter).unwrap();
        assert_eq!(invocations.lines().count(), 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_error_output_comes_first() {
        let script = "echo 'Field\tType\tNull'; echo 'ERROR 1146 (42S02) at line 1: missing table' >&2; exit 1";

        let lines = fake_client(script, 5)
            .introspect("localhost", "my_wiki", "page")
            .await
            .unwrap();

        assert!(lines[0].starts_with("ERROR 1146"));
        assert!(crate::schema_drift::ObservedTable::from_output(&lines).is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_silent_failure_is_transient() {
        let err = fake_client("exit 3", 5)
            .introspect("localhost", "my_wiki", "page")
            .await
            .unwrap_err();

        assert!(matches!(err, DriftError::Introspection(_)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_spawn_failure_is_transient() {
        let introspector = CommandIntrospector {
            config: IntrospectionConfig {
                client: "/nonexistent/drift-mysql".to_string(),
                ..IntrospectionConfig::default()
            },
        };

        let err = introspector
            .introspect("localhost", "my_wiki", "page")
            .await
            .unwrap_err();

        assert!(matches!(err, DriftError::Introspection(_)));
        assert!(err.is_transient());
    }
}
