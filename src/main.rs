use dotenv::dotenv;
use human_panic::setup_panic;
use tracing::{debug, error, warn};

// 从 lib.rs 导入模块
use rust_coursework_grading::config::AppConfig;
use rust_coursework_grading::runtime::lifetime;

#[tokio::main]
async fn main() -> std::process::ExitCode {
    dotenv().ok();

    // 记录程序启动时间
    let start_datetime = chrono::Utc::now();

    // 初始化配置
    setup_panic!();
    if let Err(e) = AppConfig::init() {
        eprintln!("Failed to initialize configuration: {e}");
        return std::process::ExitCode::FAILURE;
    }
    let config = AppConfig::get();

    // 初始化日志
    let stdout_log = std::io::stdout();
    let (non_blocking_writer, _guard) = tracing_appender::non_blocking(stdout_log);
    let filter = tracing_subscriber::EnvFilter::new(&config.app.log_level);
    let tracing_format = tracing_subscriber::fmt::format()
        .with_level(true)
        .with_ansi(true);

    let tracing_builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking_writer)
        .event_format(tracing_format);

    if config.is_development() {
        tracing_builder
            .with_file(true)
            .with_line_number(true)
            .init();
    } else {
        tracing_builder.json().init();
    }

    // 打印信息
    warn!(
        "Starting {}...
        Project: {}
        Version: {}
        Authors: {}",
        config.app.system_name,
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        env!("CARGO_PKG_AUTHORS")
    );

    let startup = match lifetime::startup::prepare_startup().await {
        Ok(startup) => startup,
        Err(e) => {
            #[cfg(debug_assertions)]
            error!("{}", e.format_colored());
            #[cfg(not(debug_assertions))]
            error!("{}", e.format_simple());
            return std::process::ExitCode::FAILURE;
        }
    };

    debug!(
        "Startup completed in {} ms",
        chrono::Utc::now()
            .signed_duration_since(start_datetime)
            .num_milliseconds()
    );

    if !config.grading.rebuild_on_startup {
        warn!("Queue rebuild disabled (grading.rebuild_on_startup = false), nothing to do");
        return std::process::ExitCode::SUCCESS;
    }

    // 从修订与评分历史重建评分队列
    let grading = startup.grading.clone();
    tokio::select! {
        res = grading.rebuild_all() => {
            match res {
                Ok(report) => {
                    warn!(
                        "Grading queue rebuilt: {} row(s), {} failure(s)",
                        report.rebuilt, report.failed
                    );
                    if report.failed > 0 {
                        return std::process::ExitCode::FAILURE;
                    }
                }
                Err(e) => {
                    error!("Grading queue rebuild failed: {}", e);
                    return std::process::ExitCode::FAILURE;
                }
            }
        }
        _ = lifetime::shutdown::listen_for_shutdown() => {
            warn!("Graceful shutdown: rebuild interrupted");
        }
    }

    std::process::ExitCode::SUCCESS
}
