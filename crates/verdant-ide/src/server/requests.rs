use anyhow::Result;

use super::{Server, from_json, result_to_response};

/// Routes a request to the handler registered for its method. Each request
/// gets exactly one response: the handler's result, a parameter error, or
/// "method not found".
pub(crate) struct RequestDispatcher<'me> {
    pending: Option<lsp_server::Request>,
    server: &'me mut Server,
}

impl<'me> RequestDispatcher<'me> {
    pub(crate) fn new(request: lsp_server::Request, server: &'me mut Server) -> Self {
        Self { pending: Some(request), server }
    }

    pub(crate) fn on<R>(mut self, handler: fn(&mut Server, R::Params) -> Result<R::Result>) -> Self
    where
        R: lsp_types::request::Request,
        R::Params: serde::de::DeserializeOwned,
        R::Result: serde::Serialize,
    {
        let Some(request) = self.pending.take_if(|request| request.method == R::METHOD) else {
            return self;
        };

        let lsp_server::Request { id, params, .. } = request;
        let params = match from_json::<R::Params>(R::METHOD, &params) {
            Ok(params) => params,
            Err(error) => {
                tracing::warn!(method = R::METHOD, "{error:#}");
                self.server.respond(lsp_server::Response::new_err(
                    id,
                    lsp_server::ErrorCode::InvalidParams as i32,
                    error.to_string(),
                ));
                return self;
            }
        };

        let _span = tracing::debug_span!("request", method = R::METHOD).entered();
        let result = handler(self.server, params);
        if let Err(error) = &result {
            tracing::warn!("{error:#}");
        }
        self.server.respond(result_to_response::<R>(id, result));
        self
    }

    pub(crate) fn finish(self) {
        let Some(request) = self.pending else { return };

        tracing::warn!(method = %request.method, "unknown request");
        self.server.respond(lsp_server::Response::new_err(
            request.id,
            lsp_server::ErrorCode::MethodNotFound as i32,
            format!("unknown request `{}`", request.method),
        ));
    }
}
