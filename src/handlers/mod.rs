// handlers/mod.rs - Two-tier handler layout
//
// Public (no session needed) → Protected (OwnerGuard on every handler)
//
// Protected handlers never rely on a router layer for authorization: each one
// takes `OwnerGuard` as its first extractor, so the owner check runs before
// the body is read or any store is touched.
pub mod protected; // Owner only: /api/projects/*, /api/settings/*, /api/storage/*
pub mod public; // Pages, read-only content API, login/logout, health
