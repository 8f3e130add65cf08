//! Tree building, emitting and cursor navigation

use crate::element::Element;
use crate::event::XmlEvent;
use crate::stream::{EventSink, EventSource};
use crate::Error;
use crate::Result;

/// A cursor for navigating the element tree by local names
pub struct Cursor<'a> {
    /// Current element
    element: &'a Element,

    /// Path to current element (for error reporting)
    path: Vec<String>,
}

/// Visitor over the element tree
pub trait Traversal {
    type Error;

    /// Called before the children of `element`
    fn enter(&mut self, element: &Element, path: &[String]) -> std::result::Result<(), Self::Error>;

    /// Called after the children of `element`
    fn leave(
        &mut self,
        _element: &Element,
        _path: &[String],
    ) -> std::result::Result<(), Self::Error> {
        Ok(())
    }
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at the given element
    pub fn new(element: &'a Element) -> Self {
        Self {
            element,
            path: vec![element.name.local.clone()],
        }
    }

    /// Get the current element
    pub fn element(&self) -> &'a Element {
        self.element
    }

    /// Get the current path
    pub fn path(&self) -> &[String] {
        &self.path
    }

    /// Navigate to a child element by local name
    pub fn child(&self, local: &str) -> Result<Cursor<'a>> {
        match self.element.find_child(local) {
            Some(child) => {
                let mut path = self.path.clone();
                path.push(local.to_string());
                Ok(Cursor {
                    element: child,
                    path,
                })
            }
            None => Err(Error::not_found(format!("{}/{}", self.path.join("/"), local))),
        }
    }

    /// Navigate using a path (e.g., "Contents/ProcessSummary[1]/Identifier")
    pub fn navigate(&self, path: &str) -> Result<Cursor<'a>> {
        let mut current = self.element;
        let mut current_path = self.path.clone();

        for segment in path.split('/') {
            if segment.is_empty() {
                continue;
            }

            let (name, index) = match segment.find('[') {
                Some(open) => {
                    let close = segment[open..].find(']').map(|i| open + i).ok_or_else(|| {
                        Error::invalid_path(path, format!("unclosed bracket in {segment}"))
                    })?;
                    let index: usize = segment[open + 1..close].parse().map_err(|_| {
                        Error::invalid_path(path, format!("invalid index in {segment}"))
                    })?;
                    (&segment[..open], index)
                }
                None => (segment, 0),
            };

            current = current
                .children
                .iter()
                .filter(|c| c.name.local == name)
                .nth(index)
                .ok_or_else(|| {
                    Error::not_found(format!("{}/{}", current_path.join("/"), segment))
                })?;
            current_path.push(segment.to_string());
        }

        Ok(Cursor {
            element: current,
            path: current_path,
        })
    }
}

/// Walk the tree depth-first using a visitor
pub fn walk<T: Traversal>(element: &Element, visitor: &mut T) -> std::result::Result<(), T::Error> {
    walk_recursive(element, visitor, &mut Vec::new())
}

fn walk_recursive<T: Traversal>(
    element: &Element,
    visitor: &mut T,
    path: &mut Vec<String>,
) -> std::result::Result<(), T::Error> {
    visitor.enter(element, path)?;
    path.push(element.name.local.clone());

    for child in &element.children {
        walk_recursive(child, visitor, path)?;
    }

    path.pop();
    visitor.leave(element, path)
}

/// Visitor writing the tree as events
struct Emitter<'s, K> {
    sink: &'s mut K,
}

impl<K: EventSink> Traversal for Emitter<'_, K> {
    type Error = K::Error;

    fn enter(&mut self, element: &Element, _path: &[String]) -> std::result::Result<(), K::Error> {
        self.sink.add(XmlEvent::start(
            element.name.clone(),
            element.attributes.clone(),
        ))?;
        for (prefix, uri) in &element.namespaces {
            self.sink.add(XmlEvent::namespace(prefix.as_deref(), uri.clone()))?;
        }
        if let Some(text) = &element.text {
            self.sink.add(XmlEvent::text(text.clone()))?;
        }
        Ok(())
    }

    fn leave(&mut self, element: &Element, _path: &[String]) -> std::result::Result<(), K::Error> {
        self.sink.add(XmlEvent::end(element.name.clone()))
    }
}

/// Write `element` and its subtree to `sink`.
///
/// Text is emitted ahead of the children, so mixed content is not preserved.
pub fn emit_tree<K: EventSink>(
    element: &Element,
    sink: &mut K,
) -> std::result::Result<(), K::Error> {
    walk(element, &mut Emitter { sink })
}

/// Consume exactly one element subtree from `source`.
///
/// Character data and comments before the first start element are skipped.
pub fn build_tree<S>(source: &mut S) -> std::result::Result<Element, S::Error>
where
    S: EventSource,
    S::Error: From<Error>,
{
    let mut stack: Vec<Element> = Vec::new();

    loop {
        let Some(event) = source.next_event()? else {
            return Err(match stack.len() {
                0 => Error::NoRootElement,
                open => Error::Truncated { open },
            }
            .into());
        };

        match event {
            XmlEvent::StartElement { name, attributes } => {
                let mut element = Element::new(name);
                element.attributes = attributes;
                stack.push(element);
            }
            XmlEvent::EndElement { name } => {
                let Some(done) = stack.pop() else {
                    return Err(Error::UnexpectedEnd { found: name.local }.into());
                };
                if done.name != name {
                    return Err(Error::mismatched_end(done.name.local, name.local).into());
                }
                match stack.last_mut() {
                    Some(parent) => {
                        parent.add_child(done);
                    }
                    None => return Ok(done),
                }
            }
            XmlEvent::Namespace { prefix, uri } => {
                if let Some(top) = stack.last_mut() {
                    top.namespaces.push((prefix, uri));
                }
            }
            XmlEvent::Characters(text) => {
                if let Some(top) = stack.last_mut() {
                    top.text.get_or_insert_with(String::new).push_str(&text);
                }
            }
            XmlEvent::Comment(_) => {}
        }
    }
}
