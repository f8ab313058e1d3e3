use std::sync::Arc;

use accrual_client::HttpAccrualClient;
use accrual_worker::utils::init_logger_with_file;
use accrual_worker::{AccrualService, BackgroundTasks, Config, MemoryStore, SeedData};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 加载 .env
    dotenv::dotenv().ok();

    // 2. 配置 + 日志
    let config = Config::from_env();
    init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref())
        .map_err(|e| anyhow::anyhow!("failed to initialise logging: {e}"))?;

    tracing::info!("Accrual worker starting...");

    // 3. 积分系统客户端
    let client_config = config.client_config();
    let client = HttpAccrualClient::new(&client_config)?;
    tracing::info!(base_url = %client.base_url(), "Accrual client ready");

    // 4. 存储
    let store = Arc::new(MemoryStore::new());
    if let Some(path) = &config.seed_file {
        let summary = SeedData::from_file(path)?.apply(&store)?;
        tracing::info!(
            seed_file = %path,
            balances = summary.balances,
            orders = summary.orders,
            "Seed data loaded"
        );
    }
    tracing::info!(orders = store.order_count(), "Order store ready");

    // 5. 对账服务
    let mut tasks = BackgroundTasks::new();
    let service = AccrualService::new(
        &config,
        Arc::new(client),
        store.clone(),
        store,
        tasks.shutdown_token(),
    );
    service.start(&mut tasks);
    tasks.log_summary();

    // 6. 等待退出信号
    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    tasks.shutdown().await;
    service.shutdown().await;

    tracing::info!("Accrual worker stopped");
    Ok(())
}
