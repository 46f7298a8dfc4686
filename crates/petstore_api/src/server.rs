//! Serve loop.

use crate::routes::build_router;
use petstore_core::{CoreLogger, PetRepository};
use std::net::SocketAddr;
use std::sync::Arc;

/// Binds `addr` and serves the pet routes until Ctrl-C.
///
/// # Errors
/// - Returns the I/O error when binding or accepting fails.
pub async fn serve<R>(addr: SocketAddr, repo: Arc<R>, logger: CoreLogger) -> std::io::Result<()>
where
    R: PetRepository + Send + Sync + 'static,
{
    let router = build_router(repo, logger.clone());

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            logger.error(format_args!(
                "event=server_bind module=api status=error addr={addr} error={err}"
            ));
            return Err(err);
        }
    };
    logger.info(format_args!(
        "event=server_start module=api status=ok addr={addr} version={}",
        petstore_core::core_version()
    ));

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(logger.clone()))
        .await?;

    logger.info(format_args!("event=server_stop module=api status=ok"));
    logger.flush();
    Ok(())
}

async fn shutdown_signal(logger: CoreLogger) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => logger.info(format_args!(
            "event=server_shutdown module=api status=requested signal=ctrl_c"
        )),
        Err(err) => {
            // No handler installed: keep serving until the process is killed.
            logger.warn(format_args!(
                "event=server_shutdown module=api status=unavailable error={err}"
            ));
            std::future::pending::<()>().await;
        }
    }
}
