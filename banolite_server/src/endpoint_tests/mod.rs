mod helpers;
mod mocks;

mod admin;
mod products;
mod profile;
mod webhook;
