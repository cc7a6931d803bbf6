use super::service::DumpService;
use may::coroutine::{self, JoinHandle};
use may::net::TcpListener;
use std::io;
use std::net::{Shutdown, SocketAddr, ToSocketAddrs};
use tracing::{debug, warn};

/// The listening side of the dump service
///
/// Binds a socket and serves every accepted connection on its own coroutine.
pub struct HttpServer(pub DumpService);

/// Handle to a running HTTP server
///
/// Owns the accept loop coroutine; [`ServerHandle::stop`] cancels it and waits
/// until the listening socket is released.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the listening socket is bound to.
    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop the server gracefully
    ///
    /// Cancels the accept loop and waits for it to finish. The listening socket is
    /// owned by that coroutine, so the port is released once this returns.
    /// Connections that were already accepted run to completion in their own
    /// coroutines.
    pub fn stop(self) {
        // SAFETY: may marks coroutine cancellation unsafe because the cancelled
        // coroutine unwinds at its next yield point. The accept loop holds no state
        // besides the listener, which is dropped during that unwind.
        unsafe {
            self.handle.coroutine().cancel();
        }
        // A cancelled coroutine reports its cancellation as a panic payload.
        if self.handle.join().is_err() {
            debug!(addr = %self.addr, "accept loop ended by cancellation");
        }
    }
}

impl HttpServer {
    /// Start the HTTP server on the given address
    ///
    /// The listening socket is bound before this returns, so a port conflict is
    /// reported here rather than from the accept loop.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or the port cannot be bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let listener = TcpListener::bind(addr)?;
        let addr = listener.local_addr()?;
        let service = self.0;
        let handle = may::go!(
            coroutine::Builder::new().name("dump-listener".to_owned()),
            move || accept_loop(&listener, &service)
        )?;
        Ok(ServerHandle { addr, handle })
    }
}

fn accept_loop(listener: &TcpListener, service: &DumpService) {
    for stream in listener.incoming() {
        let mut stream = match stream {
            Ok(stream) => stream,
            Err(err) => {
                warn!(error = %err, "failed to accept connection");
                continue;
            }
        };
        let service = service.clone();
        may::go!(move || {
            if let Err(err) = service.serve_connection(&mut stream) {
                debug!(error = %err, "connection ended with error");
            }
            stream.shutdown(Shutdown::Both).ok();
        });
    }
}
