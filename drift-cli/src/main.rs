use clap::Parser;
use drift_cli::{Cli, CliApp, Commands, run_abstract, run_check_table, run_init, setup_logging};
use drift_core::DriftError;
use tracing::error;

#[tokio::main]
async fn main() {
    // 解析命令行参数
    let cli = Cli::parse();

    // 设置日志记录
    setup_logging(cli.verbose);

    // 不需要配置文件的命令
    match &cli.command {
        Commands::Init { force } => {
            if let Err(e) = run_init(&cli.config, *force).await {
                error!("❌ 初始化失败: {}", e);
                std::process::exit(1);
            }
            return;
        }
        Commands::CheckTable {
            schema,
            format,
            table,
            observed,
            important_only,
        } => {
            if let Err(e) = run_check_table(schema, *format, table, observed, *important_only) {
                error!("❌ 比较失败: {:#}", e);
                std::process::exit(1);
            }
            return;
        }
        Commands::Abstract { sql_file, output } => {
            if let Err(e) = run_abstract(sql_file, output.as_deref()) {
                error!("❌ 转换失败: {:#}", e);
                std::process::exit(1);
            }
            return;
        }
        _ => {}
    }

    let mut app = match CliApp::new_with_config(&cli.config) {
        Ok(app) => app,
        Err(DriftError::ConfigNotFound) => {
            error!("❌ 配置文件 '{}' 未找到。", cli.config.display());
            error!("👉 请先运行 'db-drift init' 命令来创建配置文件。");
            std::process::exit(1);
        }
        Err(e) => {
            error!("❌ 应用初始化失败: {}", e);
            std::process::exit(1);
        }
    };

    // 运行命令
    if let Err(e) = app.run_command(cli.command).await {
        error!("❌ 操作失败: {:#}", e);
        std::process::exit(1);
    }
}
