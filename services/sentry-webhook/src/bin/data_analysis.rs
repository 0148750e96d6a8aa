/// データ分析HTTP Lambdaエントリポイント
///
/// 分析リクエストを受け取り、定型の分析結果を返す。
/// ANALYSIS_PROFILEでフルスタック用/minimalスタック用の応答を切り替える。
use std::sync::Arc;

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use sentry_webhook::application::AnalysisHandler;
use sentry_webhook::infrastructure::{init_logging, AnalysisConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_logging();

    info!("データ分析Lambda関数を初期化");

    let handler = Arc::new(AnalysisHandler::new(AnalysisConfig::from_env()));

    run(service_fn(move |request: Request| {
        let handler = Arc::clone(&handler);
        async move { Ok::<Response<Body>, Error>(handler.handle(&request)) }
    }))
    .await
}
