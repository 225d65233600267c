//! Continent Classifier Module
//! Maps M49 numeric country codes to one of the five recognised continents.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed set of continents a canonical record can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Continent {
    Africa,
    America,
    Asia,
    Europe,
    Oceania,
}

impl Continent {
    pub const ALL: [Continent; 5] = [
        Continent::Africa,
        Continent::America,
        Continent::Asia,
        Continent::Europe,
        Continent::Oceania,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Continent::Africa => "Africa",
            Continent::America => "America",
            Continent::Asia => "Asia",
            Continent::Europe => "Europe",
            Continent::Oceania => "Oceania",
        }
    }
}

impl fmt::Display for Continent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Continent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Continent::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| s.to_string())
    }
}

/// Capability boundary for continent lookup.
///
/// `None` means the code is unresolved and the record is dropped from the
/// canonical table.
pub trait ContinentClassifier {
    fn classify(&self, numeric_code: i64) -> Option<Continent>;
}

impl<F> ContinentClassifier for F
where
    F: Fn(i64) -> Option<Continent>,
{
    fn classify(&self, numeric_code: i64) -> Option<Continent> {
        self(numeric_code)
    }
}

/// Built-in classifier over the UN M49 numeric country codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct M49Classifier;

impl ContinentClassifier for M49Classifier {
    fn classify(&self, numeric_code: i64) -> Option<Continent> {
        u16::try_from(numeric_code).ok().and_then(m49_continent)
    }
}

/// Continent for an M49 code. Antarctica (010) and regional aggregates are
/// unresolved.
fn m49_continent(code: u16) -> Option<Continent> {
    use Continent::*;

    let continent = match code {
        // Africa
        12 | 24 | 72 | 108 | 120 | 132 | 140 | 148 | 174 | 175 | 178 | 180 | 204 | 226
        | 230 | 231 | 232 | 262 | 266 | 270 | 288 | 324 | 384 | 404 | 426 | 430 | 434
        | 450 | 454 | 466 | 478 | 480 | 504 | 508 | 516 | 562 | 566 | 624 | 638 | 646
        | 654 | 678 | 686 | 690 | 694 | 706 | 710 | 716 | 728 | 729 | 732 | 736 | 748
        | 768 | 788 | 800 | 818 | 834 | 854 | 894 => Africa,

        // America
        28 | 32 | 44 | 52 | 60 | 68 | 76 | 84 | 92 | 124 | 136 | 152 | 170 | 188 | 192
        | 212 | 214 | 218 | 222 | 238 | 254 | 304 | 308 | 312 | 320 | 328 | 332 | 340
        | 388 | 474 | 484 | 500 | 530 | 531 | 533 | 534 | 535 | 558 | 591 | 600 | 604
        | 630 | 652 | 659 | 660 | 662 | 663 | 666 | 670 | 740 | 780 | 796 | 840 | 850
        | 858 | 862 => America,

        // Asia
        4 | 31 | 48 | 50 | 51 | 64 | 96 | 104 | 116 | 144 | 156 | 158 | 196 | 268 | 275
        | 344 | 356 | 360 | 364 | 368 | 376 | 392 | 398 | 400 | 408 | 410 | 414 | 417
        | 418 | 422 | 446 | 458 | 462 | 496 | 512 | 524 | 586 | 608 | 626 | 634 | 682
        | 702 | 704 | 760 | 762 | 764 | 784 | 792 | 795 | 860 | 887 => Asia,

        // Europe
        8 | 20 | 40 | 56 | 70 | 100 | 112 | 191 | 203 | 208 | 233 | 234 | 246 | 248 | 250
        | 276 | 292 | 300 | 336 | 348 | 352 | 372 | 380 | 428 | 438 | 440 | 442 | 470
        | 492 | 498 | 499 | 528 | 578 | 616 | 620 | 642 | 643 | 674 | 688 | 703 | 705
        | 724 | 744 | 752 | 756 | 804 | 807 | 826 | 831 | 832 | 833 => Europe,

        // Oceania
        16 | 36 | 90 | 162 | 166 | 184 | 242 | 258 | 296 | 316 | 520 | 540 | 548 | 554
        | 570 | 574 | 580 | 583 | 584 | 585 | 598 | 612 | 772 | 776 | 798 | 876 | 882 => {
            Oceania
        }

        _ => return None,
    };

    Some(continent)
}
