//! Protobuf messages spoken with the simulator bridge and the controller.
//!
//! Declared with prost derives rather than generated from a `.proto` file so
//! the crate builds without `protoc`. Field tags are part of the wire
//! contract and must not be renumbered.

#![allow(clippy::enum_variant_names)]

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Empty {}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct PoseMsg {
    #[prost(double, tag = "1")]
    pub x: f64,
    #[prost(double, tag = "2")]
    pub y: f64,
    #[prost(double, tag = "3")]
    pub theta: f64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PointStamped {
    #[prost(string, tag = "1")]
    pub frame_id: String,
    #[prost(double, tag = "2")]
    pub x: f64,
    #[prost(double, tag = "3")]
    pub y: f64,
    #[prost(double, tag = "4")]
    pub z: f64,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct Twist {
    #[prost(double, tag = "1")]
    pub linear: f64,
    #[prost(double, tag = "2")]
    pub angular: f64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GoalMsg {
    #[prost(message, optional, tag = "1")]
    pub target: Option<PointStamped>,
    #[prost(double, repeated, tag = "2")]
    pub orientation: Vec<f64>,
}

#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct ServerStatus {
    #[prost(bool, tag = "1")]
    pub ready: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SimRequest {
    #[prost(oneof = "sim_request::Request", tags = "1, 2, 3, 4, 5, 6")]
    pub request: Option<sim_request::Request>,
}

pub mod sim_request {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Request {
        #[prost(message, tag = "1")]
        GetPose(super::Empty),
        #[prost(message, tag = "2")]
        GetCollision(super::Empty),
        #[prost(message, tag = "3")]
        GetTime(super::Empty),
        #[prost(message, tag = "4")]
        ResetTo(super::PoseMsg),
        #[prost(message, tag = "5")]
        PublishGoalPoint(super::PointStamped),
        #[prost(message, tag = "6")]
        PublishVelocity(super::Twist),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SimResponse {
    #[prost(oneof = "sim_response::Response", tags = "1, 2, 3, 4, 5")]
    pub response: Option<sim_response::Response>,
}

pub mod sim_response {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Response {
        #[prost(message, tag = "1")]
        Pose(super::PoseMsg),
        #[prost(bool, tag = "2")]
        Collision(bool),
        #[prost(double, tag = "3")]
        Time(f64),
        #[prost(message, tag = "4")]
        Ack(super::Empty),
        #[prost(string, tag = "5")]
        Error(String),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NavRequest {
    #[prost(oneof = "nav_request::Request", tags = "1, 2")]
    pub request: Option<nav_request::Request>,
}

pub mod nav_request {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Request {
        #[prost(message, tag = "1")]
        Status(super::Empty),
        #[prost(message, tag = "2")]
        SendGoal(super::GoalMsg),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NavResponse {
    #[prost(oneof = "nav_response::Response", tags = "1, 2, 3")]
    pub response: Option<nav_response::Response>,
}

pub mod nav_response {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Response {
        #[prost(message, tag = "1")]
        Status(super::ServerStatus),
        #[prost(message, tag = "2")]
        Ack(super::Empty),
        #[prost(string, tag = "3")]
        Error(String),
    }
}
