use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DeckError {
    #[error("deck has no slides")]
    Empty,
}

/// A progressively revealed piece of slide content.
#[derive(Debug, Clone, PartialEq)]
pub struct Fragment {
    pub text: String,
    pub visible: bool,
}

impl Fragment {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            visible: false,
        }
    }
}

/// One page of the presentation.
///
/// `ordinal` is fixed by document order when the deck is built. `active` and
/// `number` are written by the navigation controller; `number` is `None` when the
/// slide has no number display at all.
#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    ordinal: usize,
    pub title: Option<String>,
    pub lines: Vec<String>,
    pub fragments: Vec<Fragment>,
    pub active: bool,
    pub number: Option<String>,
}

impl Slide {
    pub fn new(title: Option<String>, lines: Vec<String>, fragments: Vec<Fragment>) -> Self {
        Self {
            ordinal: 0,
            title,
            lines,
            fragments,
            active: false,
            number: Some(String::new()),
        }
    }

    /// Drop the number display element.
    pub fn without_number(mut self) -> Self {
        self.number = None;
        self
    }

    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    pub fn has_number(&self) -> bool {
        self.number.is_some()
    }

    pub fn visible_fragments(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.iter().filter(|f| f.visible)
    }
}

/// Ordered snapshot of the slides in a document.
#[derive(Debug, Clone, Default)]
pub struct Deck {
    pub title: Option<String>,
    pub theme: Option<String>,
    slides: Vec<Slide>,
}

impl Deck {
    pub fn new(title: Option<String>, theme: Option<String>, slides: Vec<Slide>) -> Self {
        let slides = slides
            .into_iter()
            .enumerate()
            .map(|(ordinal, mut slide)| {
                slide.ordinal = ordinal;
                slide
            })
            .collect();
        Self {
            title,
            theme,
            slides,
        }
    }

    pub fn from_slides(slides: Vec<Slide>) -> Self {
        Self::new(None, None, slides)
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slides_mut(&mut self) -> &mut [Slide] {
        &mut self.slides
    }

    pub fn get(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Slide> {
        self.slides.get_mut(index)
    }

    pub fn active_indices(&self) -> Vec<usize> {
        self.slides
            .iter()
            .filter(|s| s.active)
            .map(Slide::ordinal)
            .collect()
    }
}
