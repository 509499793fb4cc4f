// handlers/protected/mod.rs - Owner-only mutation endpoints
//
// Every handler follows the same shape:
//   OwnerGuard → validate → one store operation → `{success: true, ...}`
// Authorization failures are 403 with the owner check's message, validation
// failures 400, store failures 500 with `details`.
pub mod projects; // POST /api/projects/{create,update,delete}
pub mod settings; // POST /api/settings/{update,ensure}
pub mod storage; // POST /api/storage/upload
