//! Protobuf messages from `tensorflow/core/util/event.proto` and
//! `tensorflow/core/framework/summary.proto`.
//!
//! Only the fields needed for scalars, images, audio and the file version
//! are declared; everything else is skipped by the decoder as unknown.

/// A single entry in an event file.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Event {
    #[prost(double, tag = "1")]
    pub wall_time: f64,
    #[prost(int64, tag = "2")]
    pub step: i64,
    #[prost(oneof = "event::What", tags = "3, 4, 5")]
    pub what: ::core::option::Option<event::What>,
}

pub mod event {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum What {
        /// e.g. `brain.Event:2`, written as the first event of every file.
        #[prost(string, tag = "3")]
        FileVersion(::prost::alloc::string::String),
        #[prost(bytes = "vec", tag = "4")]
        GraphDef(::prost::alloc::vec::Vec<u8>),
        #[prost(message, tag = "5")]
        Summary(super::Summary),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Summary {
    #[prost(message, repeated, tag = "1")]
    pub value: ::prost::alloc::vec::Vec<summary::Value>,
}

pub mod summary {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Image {
        #[prost(int32, tag = "1")]
        pub height: i32,
        #[prost(int32, tag = "2")]
        pub width: i32,
        #[prost(int32, tag = "3")]
        pub colorspace: i32,
        #[prost(bytes = "vec", tag = "4")]
        pub encoded_image_string: ::prost::alloc::vec::Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Audio {
        #[prost(float, tag = "1")]
        pub sample_rate: f32,
        #[prost(int64, tag = "2")]
        pub num_channels: i64,
        #[prost(int64, tag = "3")]
        pub length_frames: i64,
        #[prost(bytes = "vec", tag = "4")]
        pub encoded_audio_string: ::prost::alloc::vec::Vec<u8>,
        #[prost(string, tag = "5")]
        pub content_type: ::prost::alloc::string::String,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Value {
        #[prost(string, tag = "7")]
        pub node_name: ::prost::alloc::string::String,
        #[prost(string, tag = "1")]
        pub tag: ::prost::alloc::string::String,
        #[prost(oneof = "value::Value", tags = "2, 4, 6")]
        pub value: ::core::option::Option<value::Value>,
    }

    pub mod value {
        #[derive(Clone, PartialEq, ::prost::Oneof)]
        pub enum Value {
            #[prost(float, tag = "2")]
            SimpleValue(f32),
            #[prost(message, tag = "4")]
            Image(super::Image),
            #[prost(message, tag = "6")]
            Audio(super::Audio),
        }
    }
}
