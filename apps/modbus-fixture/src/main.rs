//! Modbus TCP 测试夹具：四个预置数据区，Ctrl-C 退出。

use devkit_config::FixtureConfig;
use devkit_protocol::{ModbusFixtureServer, RegionLayout};
use devkit_telemetry::{init_tracing, metrics};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let config = FixtureConfig::from_env()?;
    init_tracing();

    // FIXTURE_CONFIG_JSON 优先于统一种子配置
    let layout = match config.layout_json.as_deref() {
        Some(json) => RegionLayout::from_json(json)?,
        None => RegionLayout::uniform(config.region_size, config.bit_seed, config.register_seed),
    };
    info!(?layout, "seeding modbus data regions");

    let server = ModbusFixtureServer::bind(&config.listen_addr, &layout).await?;
    server
        .serve_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "failed to listen for ctrl-c, serving until killed");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    info!(metrics = ?metrics().snapshot(), "modbus fixture stopped");
    Ok(())
}
