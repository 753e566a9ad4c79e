//! Plain-text rendering of a storefront [`Frame`].

use std::io::{self, Write};

use minishop_store::view::{CartBody, CartView, CatalogGrid, ModalView};
use minishop_store::{Frame, Renderer};

/// Which parts of a frame to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Catalog,
    Cart,
    Modal,
}

pub struct TextRenderer<W: Write> {
    out: W,
    sections: Vec<Section>,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W, sections: &[Section]) -> Self {
        Self {
            out,
            sections: sections.to_vec(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn catalog(&mut self, frame: &Frame) -> io::Result<()> {
        if frame.search.trim().is_empty() {
            writeln!(self.out, "{}", frame.sort_label)?;
        } else {
            writeln!(self.out, "{}  search: \"{}\"", frame.sort_label, frame.search.trim())?;
        }

        let cards = match &frame.catalog {
            CatalogGrid::Cards(cards) => cards,
            CatalogGrid::NoMatches => {
                writeln!(self.out, "No products found. Try a different search.")?;
                return Ok(());
            }
        };

        writeln!(self.out, "{:<8}{:<32}{:<28}PRICE", "ID", "NAME", "DETAILS")?;
        for card in cards {
            writeln!(
                self.out,
                "{:<8}{:<32}{:<28}{}",
                card.id.to_string(),
                card.name,
                card.details,
                card.price_label
            )?;
        }
        Ok(())
    }

    fn cart(&mut self, cart: &CartView) -> io::Result<()> {
        writeln!(self.out, "Cart ({} items)", cart.item_count)?;
        match &cart.body {
            CartBody::Empty => {
                writeln!(self.out, "Your cart is empty. Add products from the catalog.")?;
            }
            CartBody::Lines {
                lines,
                subtotal_label,
                ..
            } => {
                for line in lines {
                    writeln!(self.out, "[{}] {} ({})", line.id, line.name, line.details)?;
                    writeln!(
                        self.out,
                        "    {} × {} = {}",
                        line.quantity, line.unit_price_label, line.line_total_label
                    )?;
                }
                writeln!(self.out, "Subtotal: {subtotal_label}")?;
            }
        }
        Ok(())
    }

    fn modal(&mut self, modal: Option<&ModalView>) -> io::Result<()> {
        let Some(modal) = modal else {
            return Ok(());
        };
        writeln!(self.out, "{}", modal.name)?;
        writeln!(self.out, "Concentration: {}", modal.concentration)?;
        writeln!(self.out, "Volume: {}", modal.volume)?;
        writeln!(self.out, "Price: {}", modal.price_label)?;
        writeln!(self.out, "Image: {}", modal.image_url)?;
        writeln!(self.out, "Quantity: {}", modal.pending)
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    type Error = io::Error;

    fn render(&mut self, frame: &Frame) -> Result<(), Self::Error> {
        let sections = self.sections.clone();
        for (i, section) in sections.iter().enumerate() {
            if i > 0 {
                writeln!(self.out)?;
            }
            match section {
                Section::Catalog => self.catalog(frame)?,
                Section::Cart => self.cart(&frame.cart)?,
                Section::Modal => self.modal(frame.modal.as_ref())?,
            }
        }
        self.out.flush()
    }
}
