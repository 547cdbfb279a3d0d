use crate::client::state::{Connection, MaybeFrame};
use crate::error::{protocol_error, to_runtime_error};
use crate::{Context, Result};
use futures::{SinkExt, StreamExt};
use lodemq_codec::codec::TextCodec;
use lodemq_codec::frame::{self, ErrorKind, Frame, Request};
use log::{error, info, trace};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::codec::Framed;

/// Serves a client until it quits or disconnects. Commands are processed one by one, the replies
/// of a command are flushed before the next line is read.
pub(crate) async fn handle_client<S>(socket: S, context: Context) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut framed = Framed::new(socket, TextCodec::default());
    let stats = context.stats.clone();
    let mut conn = Connection::new(context);

    stats.connection_opened();

    let result = command_loop(&mut conn, &mut framed).await;

    conn.release().await;
    stats.connection_closed();

    info!("Client disconnected id = {}", conn.id());

    result
}

async fn command_loop<S>(conn: &mut Connection, framed: &mut Framed<S, TextCodec>) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    while let Some(data) = framed.next().await {
        let request = match data {
            Ok(request) => request,
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                // Cannot find the next line boundary, so the connection is closed.
                error!("Bad request line from {} {:?}", conn.id(), e);

                framed
                    .send(Frame::Frame(frame::error(ErrorKind::ClientError, "Bad request line")))
                    .await?;

                return Ok(());
            }
            Err(e) => return Err(Box::new(e)),
        };

        trace!("Incoming {:?}", request);

        match handle_request(conn, request).await? {
            Some(response) => {
                trace!("Outgoing {:?}", response);

                framed.send(response).await?;
            }
            None => return Ok(()),
        }
    }

    Ok(())
}

/// Dispatches a request line by the command name. Returns `None` if the client quits.
async fn handle_request(conn: &mut Connection, request: Request) -> MaybeFrame {
    let command = request.command().map(str::to_ascii_lowercase);

    let result = match command.as_deref() {
        Some("get") => conn.get(&request.args).await.map(Some),
        Some("stats") => Ok(Some(conn.stats().await)),
        Some("version") => Ok(Some(conn.version())),
        Some("quit") => Ok(None),
        _ => protocol_error("Unknown command"),
    };

    // Convert runtime error to an error line
    match result {
        Err(e) => match to_runtime_error(e) {
            Ok(rte) => Ok(Some(rte.into())),
            Err(e2) => Err(e2),
        },
        _ => result,
    }
}
