// handlers/protected/mod.rs - Dashboard API, requires a Bearer JWT
//
// Security Level: operator token issued by `bridge token issue`
// Route Prefix: /api
// Middleware: jwt_auth_middleware

pub mod dashboard; // GET /api/dashboard, /api/transactions, /api/logs, /api/logs/summary
pub mod mappings;  // /api/data-mappings[/:id]
pub mod settings;  // GET /api/settings, PUT /api/settings/:service
pub mod sync;      // POST /api/sync-data, /api/test-connection, /api/add-test-transaction
