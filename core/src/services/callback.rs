use crate::client::Requester;
use crate::context::Context;
use crate::error::ApiError;
use crate::types::Callback;

const CALLBACK_PATH: &str = "/api/v1/callback";

/// Callback URL registration.
#[derive(Debug, Clone, Copy)]
pub struct CallbackService<'a, R> {
    client: &'a R,
}

impl<'a, R: Requester> CallbackService<'a, R> {
    pub fn new(client: &'a R) -> Self {
        Self { client }
    }

    /// Fetch the current callback configuration.
    pub fn get(&self, ctx: &Context, callback: &Callback) -> Result<Callback, ApiError> {
        self.call(ctx, "GET", callback)
    }

    /// Register `callback.url`. When `callback.test` is set and the API's
    /// probe fails, this returns `CallbackRejected` with the echoed record.
    pub fn set(&self, ctx: &Context, callback: &Callback) -> Result<Callback, ApiError> {
        let reply = self.call(ctx, "POST", callback)?;
        if reply.is_rejected() {
            return Err(ApiError::CallbackRejected(Box::new(reply)));
        }
        Ok(reply)
    }

    /// Remove the callback. The reply carries the removed URL as `previous_url`.
    pub fn delete(&self, ctx: &Context, callback: &Callback) -> Result<Callback, ApiError> {
        self.call(ctx, "DELETE", callback)
    }

    fn call(&self, ctx: &Context, method: &str, callback: &Callback) -> Result<Callback, ApiError> {
        let request = self.client.new_request(method, CALLBACK_PATH, Some(callback))?;
        self.client.execute_json(ctx, &request)
    }
}
