pub mod api;
pub mod city;
pub mod config;
pub mod controller;
pub mod difficulty;
pub mod normalize;
pub mod round;
pub mod settings;
pub mod state;
pub mod view;
