use crate::{cli::session, error, info, server};

pub async fn serve(warm: bool) {
    let state = session::open().await;
    info!("Serving liked songs of {}", state.owner_id);

    if warm {
        session::load_snapshot(&state).await;
    }

    if let Err(e) = server::start_app_server(state).await {
        error!("Server stopped: {}", e);
    }
}
