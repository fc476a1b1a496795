// handlers/public/mod.rs - Endpoints reachable without a dashboard token
//
// Status probes, the Clio OAuth round-trip and the webhook receivers. Webhook
// senders cannot carry our JWT, so these stay public.

pub mod oauth;    // GET /authorize, GET /api/clio-callback
pub mod status;   // GET /, GET /ping, GET /health
pub mod webhooks; // POST /api/ghl-webhook, POST /api/clio-webhook
