//! Request and response shapes of the HTTP surface

mod dto;

pub use dto::{
    ErrorResponse, LineRequest, LineResponse, LineUpdateRequest, SectionRequest, SectionResponse, StationRequest,
    StationResponse,
};
