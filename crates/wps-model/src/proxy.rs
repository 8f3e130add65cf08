//! Owner-aware wrapper proxies
//!
//! The legacy vocabulary groups some lists inside wrapper elements
//! (`DataInputs`, `ProcessOutputs`) that the canonical records do not have;
//! the records store the items as a flat list. A proxy stands for such a
//! wrapper and keeps no state of its own: every access goes to the owner.
//!
//! [`Proxy::of`] requires the owner up front. [`ProxySlot`] is the two-phase
//! form for binders that meet the wrapper element before they can hand over
//! the owner; touching it before [`ProxySlot::bind`] is an
//! [`Error::UnboundProxy`].

use crate::projection::WireCodec;
use crate::{Error, Result};
use std::marker::PhantomData;
use tracing::trace;
use wps_ir::{Element, QName, Version};

/// A wire-only wrapper over a flat list owned by `Owner`
pub trait WrapperProxy {
    type Owner;
    type Item;

    /// Local name of the wrapper element
    const WRAPPER: &'static str;

    fn items(owner: &Self::Owner) -> &[Self::Item];

    fn items_mut(owner: &mut Self::Owner) -> &mut Vec<Self::Item>;
}

/// Read view of a wrapper, bound to its owner at construction
pub struct Proxy<'a, P: WrapperProxy> {
    owner: &'a P::Owner,
    wrapper: PhantomData<P>,
}

impl<'a, P: WrapperProxy> Proxy<'a, P> {
    pub fn of(owner: &'a P::Owner) -> Self {
        Self {
            owner,
            wrapper: PhantomData,
        }
    }

    pub fn items(&self) -> &'a [P::Item] {
        P::items(self.owner)
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Encode the wrapper element with every item of the owner as a child
    pub fn encode(&self, version: Version, name: QName) -> Element
    where
        P::Item: WireCodec,
    {
        let mut wrapper = Element::new(name);
        for item in self.items() {
            wrapper.add_child(item.encode(version));
        }
        wrapper
    }
}

/// Binder-facing handle whose owner is supplied after construction
pub struct ProxySlot<'a, P: WrapperProxy> {
    owner: Option<&'a mut P::Owner>,
}

impl<'a, P: WrapperProxy> ProxySlot<'a, P> {
    pub fn unbound() -> Self {
        Self { owner: None }
    }

    /// Bind the owner; a slot is bound exactly once
    pub fn bind(&mut self, owner: &'a mut P::Owner) -> Result<()> {
        if self.owner.is_some() {
            return Err(Error::AlreadyBound {
                wrapper: P::WRAPPER,
            });
        }
        self.owner = Some(owner);
        Ok(())
    }

    pub fn is_bound(&self) -> bool {
        self.owner.is_some()
    }

    pub fn items(&self) -> Result<&[P::Item]> {
        match &self.owner {
            Some(owner) => Ok(P::items(owner)),
            None => Err(Error::UnboundProxy {
                wrapper: P::WRAPPER,
            }),
        }
    }

    pub fn push(&mut self, item: P::Item) -> Result<()> {
        match &mut self.owner {
            Some(owner) => {
                P::items_mut(owner).push(item);
                Ok(())
            }
            None => Err(Error::UnboundProxy {
                wrapper: P::WRAPPER,
            }),
        }
    }

    /// Decode every child of `wrapper` named `P::Item::ELEMENT` into the owner
    pub fn decode(&mut self, version: Version, wrapper: &Element) -> Result<usize>
    where
        P::Item: WireCodec,
    {
        if !self.is_bound() {
            return Err(Error::UnboundProxy {
                wrapper: P::WRAPPER,
            });
        }
        let mut decoded = 0;
        for child in wrapper.find_children(<P::Item as WireCodec>::ELEMENT) {
            self.push(P::Item::decode(version, child)?)?;
            decoded += 1;
        }
        trace!(wrapper = P::WRAPPER, items = decoded, "Decoded wrapper items");
        Ok(decoded)
    }
}
