/// Sentry Webhook HTTP Lambdaエントリポイント
///
/// API Gateway経由で受け取ったSentryアラートを整形し、
/// プッシュ通知APIへ中継する。
use std::sync::Arc;

use lambda_http::{run, service_fn, Body, Error, Request, Response};
use sentry_webhook::application::WebhookHandler;
use sentry_webhook::infrastructure::{init_logging, LineNotifyClient, NotifierConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    info!("Sentry Webhook Lambda関数を初期化");

    // 設定とHTTPクライアントはコールドスタート時に一度だけ構築する
    let config = NotifierConfig::from_env()?;
    let client = LineNotifyClient::new(&config)?;
    let handler = Arc::new(WebhookHandler::new(config, client));

    run(service_fn(move |request: Request| {
        let handler = Arc::clone(&handler);
        async move { Ok::<Response<Body>, Error>(handler.handle(&request).await) }
    }))
    .await
}
