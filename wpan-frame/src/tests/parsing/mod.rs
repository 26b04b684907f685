use super::*;

mod ack;
mod beacon;
mod command;
mod data;
mod secured;
