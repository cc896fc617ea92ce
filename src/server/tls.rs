//! Optional TLS support, layered transparently over the plain-TCP accept path.
//!
//! [`AnyStream`] lets [`HttpConnection`](crate::server::connection::HttpConnection)
//! stay generic over "however the bytes arrived" instead of hard-coding [`TcpStream`]:
//! a connection is either a bare socket or a `rustls` session wrapped around one.

use std::{
    fs::File,
    io::{self, BufReader},
    path::Path,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use tokio::{
    io::{AsyncRead, AsyncWrite, ReadBuf},
    net::TcpStream,
};
use tokio_rustls::{
    rustls::{
        pki_types::{CertificateDer, PrivateKeyDer},
        ServerConfig,
    },
    server::TlsStream,
    TlsAcceptor as RustlsAcceptor,
};

/// Either a plain TCP connection or a `rustls`-terminated TLS one.
///
/// Implements [`AsyncRead`]/[`AsyncWrite`] by delegating to whichever variant
/// is held, so the rest of the server never has to care which kind it got.
pub(crate) enum AnyStream {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl AnyStream {
    #[inline]
    pub(crate) fn plain(stream: TcpStream) -> Self {
        Self::Plain(stream)
    }
}

impl AsyncRead for AnyStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            Self::Tls(stream) => Pin::new(stream.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for AnyStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Self::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            Self::Tls(stream) => Pin::new(stream.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(stream) => Pin::new(stream).poll_flush(cx),
            Self::Tls(stream) => Pin::new(stream.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            Self::Tls(stream) => Pin::new(stream.as_mut()).poll_shutdown(cx),
        }
    }
}

/// Wraps accepted [`TcpStream`]s in a TLS handshake using a certificate/key pair
/// loaded once at startup.
#[derive(Clone)]
pub(crate) struct TlsAcceptor(RustlsAcceptor);

impl TlsAcceptor {
    /// Loads a PEM-encoded certificate chain and private key from disk and
    /// builds an acceptor around them.
    pub(crate) fn from_pem_files(cert_path: &Path, key_path: &Path) -> io::Result<Self> {
        let certs = load_certs(cert_path)?;
        let key = load_key(key_path)?;

        let config = ServerConfig::builder()
            .with_no_client_auth()
            .with_single_cert(certs, key)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        Ok(Self(RustlsAcceptor::from(Arc::new(config))))
    }

    #[inline]
    pub(crate) async fn accept(&self, stream: TcpStream) -> io::Result<AnyStream> {
        self.0
            .accept(stream)
            .await
            .map(|stream| AnyStream::Tls(Box::new(stream)))
    }
}

fn load_certs(path: &Path) -> io::Result<Vec<CertificateDer<'static>>> {
    let file = File::open(path)?;
    rustls_pemfile::certs(&mut BufReader::new(file)).collect()
}

fn load_key(path: &Path) -> io::Result<PrivateKeyDer<'static>> {
    let file = File::open(path)?;
    rustls_pemfile::private_key(&mut BufReader::new(file))?
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "no private key found in file"))
}
