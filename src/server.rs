use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{error, info};
use crate::filter::FilterChain;
use crate::request::RemoteAddr;
use crate::settings::ServerSettings;

/// 필터 체인 앞에 놓이는 HTTP/1 리스너
pub struct FilterServer {
    listener: TcpListener,
    chain: Arc<FilterChain>,
}

impl FilterServer {
    pub async fn bind(settings: &ServerSettings, chain: FilterChain) -> std::io::Result<Self> {
        let address = settings.socket_address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|e| {
                error!(error = %e, address = %address, "HTTP 포트 바인딩 실패");
                e
            })?;

        info!(address = %address, "HTTP 리스너 시작");
        Ok(Self {
            listener,
            chain: Arc::new(chain),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run(self) -> std::io::Result<()> {
        loop {
            let (stream, remote) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!(error = %e, "HTTP 연결 수락 실패");
                    continue;
                }
            };

            let chain = self.chain.clone();
            tokio::spawn(async move {
                let io = TokioIo::new(stream);
                let service = service_fn(move |mut req: Request<Incoming>| {
                    let chain = chain.clone();
                    async move {
                        req.extensions_mut().insert(RemoteAddr(remote));
                        Ok::<_, Infallible>(chain.dispatch(req).await)
                    }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    error!(error = %err, remote = %remote, "HTTP 연결 처리 실패");
                }
            });
        }
    }
}
