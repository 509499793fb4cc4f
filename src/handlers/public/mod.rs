// handlers/public/mod.rs - Public handlers (no session required)
//
// Server-rendered pages, the read-only content API, the owner probe, and the
// login/logout proxy to the identity provider. Pages still read the session
// so owner affordances render for the owner.
pub mod auth; // GET /api/auth/is-owner, POST /auth/login, POST /auth/logout
pub mod content; // GET /api/settings, /api/projects[/:slug]
pub mod health; // GET /health, GET /api
pub mod pages; // GET /, /projects, /contact, /assets/owner.js

pub use health::{health, root};
