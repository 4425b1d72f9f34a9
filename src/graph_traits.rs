// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module contains the traits that allow typed lookups into a
//! [`NetworkGraph`][crate::NetworkGraph].

use crate::model::{
    ConductingEquipment, ConnectivityNode, EquipmentContainer, IdentifiedObject, NetworkObject,
    PowerTransformerEnd, Terminal,
};

/**
This trait is implemented by every concrete object type that can be looked up
by `mRID` with [`NetworkGraph::get_by_id`][crate::NetworkGraph::get_by_id].

A lookup succeeds only if the object exists *and* has the requested type.

<details>
<summary>Example:</summary>

```ignore
use dso_network_topology::model::{ConductingEquipment, EquipmentContainer};

let breaker = graph.get_by_id::<ConductingEquipment>(breaker_id)?;
let bay = graph.get_by_id::<EquipmentContainer>(breaker.container.unwrap())?;

// Fails with a `NotFound` error, the id refers to equipment.
assert!(graph.get_by_id::<EquipmentContainer>(breaker_id).is_err());
```

</details>
*/
pub trait ObjectKind: Sized {
    /// The type name used in error messages.
    const TYPE_NAME: &'static str;

    /// Returns the typed object, if `object` is of this type.
    fn from_object(object: &NetworkObject) -> Option<&Self>;

    /// Returns the identity of the object.
    fn identity(&self) -> &IdentifiedObject;
}

macro_rules! impl_object_kind {
    ($($ty:ident),*) => {
        $(
            impl ObjectKind for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);

                fn from_object(object: &NetworkObject) -> Option<&Self> {
                    match object {
                        NetworkObject::$ty(x) => Some(x),
                        _ => None,
                    }
                }

                fn identity(&self) -> &IdentifiedObject {
                    &self.identity
                }
            }
        )*
    };
}

impl_object_kind!(
    ConductingEquipment,
    ConnectivityNode,
    Terminal,
    EquipmentContainer,
    PowerTransformerEnd
);
