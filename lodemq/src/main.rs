mod client;
mod config;
mod error;
mod queue;
mod restapi;
mod stats;

#[cfg(test)]
mod tests;

use env_logger::Builder;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use log::{error, info};
use std::io::Write;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;

pub use error::Result;

/// Things shared by all the connections.
#[derive(Clone)]
pub struct Context {
    pub queue_manager: queue::manager::QueueManagerSink,
    pub stats: Arc<stats::ServerStats>,
}

#[macro_export]
macro_rules! chk {
    ($val:expr) => {
        match $val {
            ok @ Ok(_) => ok,
            Err(e) => {
                log::error!("Error {:?}", e);

                Err(e)
            }
        }
    };
}

#[macro_export]
macro_rules! logerr {
    ($val:expr) => {
        if let Err(e) = $val {
            error!("Error {:?}", e);
        }
    };
}

#[macro_export]
macro_rules! send {
    ($channel:expr, $message:expr) => {
        $crate::chk!(
            $channel
                .send_timeout($message, tokio::time::Duration::from_secs(1))
                .await
        )
    };
}

fn setup_logger() {
    let mut builder = Builder::from_default_env();

    builder
        .format_timestamp_millis()
        .format(|buf, record| {
            let lvl = buf.default_level_style(record.level()).bold();

            writeln!(
                buf,
                "{} - [{lvl}{:5}{lvl:#}] {}:{} - {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or_default(),
                record.line().unwrap_or_default(),
                record.args()
            )
        })
        .write_style(env_logger::WriteStyle::Always)
        .init();
}

async fn start_http(context: Context, url: &str) -> Result<()> {
    info!("Start HTTP admin API on {}", url);

    let listener = TcpListener::bind(url).await?;

    tokio::spawn(async move {
        loop {
            let stream = match listener.accept().await {
                Ok((stream, _)) => stream,
                Err(e) => {
                    error!("HTTP accept error {:?}", e);
                    continue;
                }
            };
            let context = context.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req| restapi::route(req, context.clone()));

                if let Err(e) = http1::Builder::new().serve_connection(TokioIo::new(stream), service).await {
                    error!("HTTP error {:?}", e);
                }
            });
        }
    });

    Ok(())
}

async fn start_server(context: Context, url: &str) -> Result<()> {
    info!("Start listening on {}", url);

    let listener = TcpListener::bind(url).await?;

    loop {
        let (socket, addr) = listener.accept().await?;
        let ctx = context.clone();

        tokio::spawn(async move {
            if let Err(e) = client::conn::handle_client(socket, ctx).await {
                error!("Error handling client {} {:?}", addr, e)
            }
        });
    }
}

#[tokio::main]
pub async fn main() -> Result<()> {
    #[cfg(feature = "tracing")]
    console_subscriber::init();

    #[cfg(not(feature = "tracing"))]
    setup_logger();

    let cli_config = config::cli();

    let config = config::parse_config(&cli_config.config_file_path)?;

    let context = Context {
        queue_manager: queue::manager::start(),
        stats: Arc::new(stats::ServerStats::default()),
    };

    for name in &config.queues {
        queue::manager::declare_queue(&context.queue_manager, name).await?;
    }

    start_http(context.clone(), &config.network.http_listen).await?;

    tokio::select! {
        result = start_server(context, &config.network.listen) => result?,
        result = signal::ctrl_c() => result?,
    }

    info!("Shutting down");

    Ok(())
}
