//! Operation-level view of an API document
//!
//! [`ApiModel`] reads the title, tags, and every operation under `paths`.
//! Parameter and request body references are followed, and schemas are
//! built with `looseapi-schema` so example payloads can be synthesized.
//!
//! ## Usage
//! ```
//! use looseapi_model::ApiModel;
//! use looseapi_parser::{Document, ParseOptions};
//!
//! let text = "info:\n  title: Pets\npaths:\n  /pets/{petId}:\n    get:\n      tags:\n        - pets\n      parameters:\n        - name: petId\n          in: path\n          required: true\n";
//! let document = Document::from_text(text, &ParseOptions::default()).unwrap();
//! let model = ApiModel::from_document(document).unwrap();
//!
//! let operation = model.operation("get_pets").unwrap();
//! assert!(operation.has_path_params());
//! assert_eq!(model.operations_for_tag("pets").len(), 1);
//! ```

mod model;
mod operation;

pub use model::{ApiModel, ModelOptions};
pub use operation::{derive_operation_id, Operation, Parameter, ParameterLocation, RequestBody};
