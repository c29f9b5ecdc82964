//! recommendation 二进制入口：初始化日志并启动应用。

mod app;
mod logging;

#[tokio::main]
/// 启动 recommendation 服务。
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init();
    app::run(app::listen_addr(std::env::var("PORT").ok().as_deref())).await
}
