//! 输入数据源与绑定元数据

mod inference;
mod metadata;
mod registry;
mod source;
mod values;

pub use inference::{infer_binding_source, route_parameter_names};
pub use metadata::{
    describe, describe_with, BindingAttribute, BindingInfo, BindingMetadataProvider,
    EmptyBodyBehavior, HandlerBindings, MemberDescriptor, ParameterBinding, ParameterKind,
};
pub use registry::{BindingSourceRegistry, BindingSourceSubmission};
pub use source::BindingSource;
pub use values::{read_from, select_value, RequestValues};
