mod chain;
mod common;
mod jurisdictions;
