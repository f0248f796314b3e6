// orderflow/src/model/page.rs

use super::UserId;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Paging request: 1-based page number and page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageForm {
  #[serde(default = "default_page")]
  pub page: u32,
  #[serde(default = "default_size")]
  pub size: u32,
}

fn default_page() -> u32 {
  1
}

fn default_size() -> u32 {
  DEFAULT_PAGE_SIZE
}

impl Default for PageForm {
  fn default() -> Self {
    Self {
      page: default_page(),
      size: default_size(),
    }
  }
}

impl PageForm {
  /// Zero-based offset of the first entity on this page.
  pub fn offset(&self) -> usize {
    (self.page.max(1) as usize - 1) * self.size as usize
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageInformation {
  pub page: u32,
  pub size: u32,
  pub total_number_of_entities: u64,
  pub total_number_of_pages: u64,
}

impl PageInformation {
  pub fn new(form: &PageForm, total_number_of_entities: u64) -> Self {
    let total_number_of_pages = if form.size == 0 {
      0
    } else {
      total_number_of_entities.div_ceil(form.size as u64)
    };
    Self {
      page: form.page,
      size: form.size,
      total_number_of_entities,
      total_number_of_pages,
    }
  }
}

/// A page of homogeneous entities plus paging metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
  pub entities: Vec<T>,
  pub page_information: PageInformation,
}

impl<T> Page<T> {
  pub fn new(page_information: PageInformation, entities: Vec<T>) -> Self {
    Self {
      entities,
      page_information,
    }
  }
}

/// Listing filter: only orders created by `owner_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderFilter {
  pub owner_id: UserId,
  pub page_form: PageForm,
}
