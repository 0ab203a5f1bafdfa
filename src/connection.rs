//! # Connection
//!
//! A [`Connection`] pairs a transport with the session reference obtained at
//! login. It is the explicit context value every generated call takes as its
//! first parameter, and it prepends the session reference to the wire arguments
//! of each call. Cloning is cheap and the session never changes after login,
//! so a connection can be shared freely between tasks.
//!
//! ```ignore
//! let conn = Connection::login_with_password(transport, "root", "secret", "1.0", "my-tool").await?;
//! conn.check_api_version().await?;
//! let vms = Vm::get_all(&conn).await?;
//! conn.logout().await?;
//! ```

use crate::framework::{
    invoke, ApiVersion, Error, FromValue, Ref, Result, ToValue, Transport, Value, ASYNC_PREFIX,
};
use crate::model::{Host, Session, Task};
use std::fmt;
use std::sync::Arc;
use tracing::{info, instrument};

/// An authenticated session over a transport.
#[derive(Clone)]
pub struct Connection {
    transport: Arc<dyn Transport>,
    session: Ref<Session>,
}

impl Connection {
    /// Wraps an existing session reference.
    pub fn new(transport: Arc<dyn Transport>, session: Ref<Session>) -> Self {
        Self { transport, session }
    }

    /// Logs in and returns a connection bound to the new session.
    ///
    /// `version` is the login protocol version (`"1.0"` for current servers),
    /// `originator` identifies the client in the server's logs.
    #[instrument(skip(transport, password))]
    pub async fn login_with_password(
        transport: Arc<dyn Transport>,
        username: &str,
        password: &str,
        version: &str,
        originator: &str,
    ) -> Result<Self> {
        let session: Ref<Session> = call_unauthenticated(
            transport.as_ref(),
            "session.login_with_password",
            vec![
                username.to_value(),
                password.to_value(),
                version.to_value(),
                originator.to_value(),
            ],
        )
        .await?;
        info!("Logged in");
        Ok(Self::new(transport, session))
    }

    /// Logs in to the local host only, bypassing the pool master. Used when the
    /// master is unreachable.
    #[instrument(skip(transport, password))]
    pub async fn slave_local_login_with_password(
        transport: Arc<dyn Transport>,
        username: &str,
        password: &str,
    ) -> Result<Self> {
        let session: Ref<Session> = call_unauthenticated(
            transport.as_ref(),
            "session.slave_local_login_with_password",
            vec![username.to_value(), password.to_value()],
        )
        .await?;
        info!("Logged in locally");
        Ok(Self::new(transport, session))
    }

    /// Ends the session. The connection is consumed since nothing can be called
    /// on it afterwards.
    pub async fn logout(self) -> Result<()> {
        self.call::<()>("session.logout", vec![]).await?;
        info!("Logged out");
        Ok(())
    }

    /// Ends a session obtained with [`Connection::slave_local_login_with_password`].
    pub async fn local_logout(self) -> Result<()> {
        self.call::<()>("session.local_logout", vec![]).await?;
        info!("Logged out locally");
        Ok(())
    }

    pub fn session(&self) -> &Ref<Session> {
        &self.session
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Calls `method` with the session reference prepended to `args` and
    /// decodes the result.
    #[instrument(level = "debug", skip(self, args))]
    pub async fn call<R: FromValue>(&self, method: &str, args: Vec<Value>) -> Result<R> {
        let mut params = Vec::with_capacity(args.len() + 1);
        params.push(self.session.to_value());
        params.extend(args);
        let value = invoke(self.transport.as_ref(), method, params).await?;
        R::from_value(&value)
    }

    /// Calls the `Async.` form of `method` and returns the task tracking it.
    pub async fn call_async(&self, method: &str, args: Vec<Value>) -> Result<Ref<Task>> {
        self.call(&format!("{ASYNC_PREFIX}{method}"), args).await
    }

    /// Reads the API version of the host this session is on.
    ///
    /// Fails with [`Error::VersionMismatch`] if its major version differs from
    /// [`ApiVersion::LATEST`]. Returns the server's version otherwise.
    pub async fn check_api_version(&self) -> Result<ApiVersion> {
        let host = Session::get_this_host(self, &self.session).await?;
        let server = ApiVersion::new(
            Host::get_api_version_major(self, &host).await?,
            Host::get_api_version_minor(self, &host).await?,
        );
        if !ApiVersion::LATEST.is_compatible_with(&server) {
            return Err(Error::VersionMismatch {
                client: ApiVersion::LATEST,
                server,
            });
        }
        info!(%server, "API version checked");
        Ok(server)
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Calls `method` without a session. Only the login family needs this.
pub async fn call_unauthenticated<R: FromValue>(
    transport: &dyn Transport,
    method: &str,
    args: Vec<Value>,
) -> Result<R> {
    let value = invoke(transport, method, args).await?;
    R::from_value(&value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::mock::MockServer;
    use crate::framework::FailureKind;

    #[tokio::test]
    async fn login_sends_no_session() {
        let mut server = MockServer::new();
        server
            .expect("session.login_with_password")
            .return_value("OpaqueRef:session");

        let conn = Connection::login_with_password(
            Arc::new(server.transport()),
            "root",
            "secret",
            "1.0",
            "tests",
        )
        .await
        .unwrap();

        assert_eq!(conn.session().as_str(), "OpaqueRef:session");
        let calls = server.calls();
        assert_eq!(
            calls[0].params,
            vec![
                Value::from("root"),
                Value::from("secret"),
                Value::from("1.0"),
                Value::from("tests"),
            ]
        );
        server.verify();
    }

    #[tokio::test]
    async fn bad_credentials_are_typed() {
        let mut server = MockServer::new();
        server
            .expect("session.login_with_password")
            .return_failure("SESSION_AUTHENTICATION_FAILED", &["root", "bad password"]);

        let err = Connection::login_with_password(Arc::new(server.transport()), "root", "x", "1.0", "tests")
            .await
            .unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::SessionAuthenticationFailed));
    }

    #[tokio::test]
    async fn calls_prepend_the_session() {
        let mut server = MockServer::new();
        server.expect("session.logout").return_value("");

        let conn = server.connection("OpaqueRef:s");
        conn.logout().await.unwrap();

        assert_eq!(server.calls()[0].params, vec![Value::from("OpaqueRef:s")]);
    }

    #[tokio::test]
    async fn local_logout_uses_its_own_method() {
        let mut server = MockServer::new();
        server.expect("session.local_logout").return_value("");

        let conn = server.connection("OpaqueRef:local");
        conn.local_logout().await.unwrap();

        let calls = server.calls();
        assert_eq!(calls[0].method, "session.local_logout");
        assert_eq!(calls[0].params, vec![Value::from("OpaqueRef:local")]);
        server.verify();
    }

    #[tokio::test]
    async fn version_check_reads_the_session_host() {
        let mut server = MockServer::new();
        server.expect("session.get_this_host").return_value("OpaqueRef:h");
        server.expect("host.get_API_version_major").return_value(Value::Int(2));
        server.expect("host.get_API_version_minor").return_value(Value::Int(16));

        let conn = server.connection("OpaqueRef:s");
        assert_eq!(conn.check_api_version().await.unwrap(), ApiVersion::new(2, 16));

        let calls = server.calls();
        assert_eq!(calls[1].params, vec![Value::from("OpaqueRef:s"), Value::from("OpaqueRef:h")]);
        server.verify();
    }

    #[tokio::test]
    async fn version_check_rejects_another_major() {
        let mut server = MockServer::new();
        server.expect("session.get_this_host").return_value("OpaqueRef:h");
        server.expect("host.get_API_version_major").return_value(Value::Int(1));
        server.expect("host.get_API_version_minor").return_value(Value::Int(9));

        let err = server.connection("OpaqueRef:s").check_api_version().await.unwrap_err();
        assert!(matches!(
            err,
            Error::VersionMismatch { server, .. } if server == ApiVersion::new(1, 9)
        ));
    }
}
