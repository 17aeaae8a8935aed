use nom::branch::alt;
use nom::bytes::complete::{take_till1, take_until, take_while1};
use nom::character::complete::{char, space0};
use nom::combinator::{eof, map, opt, verify};
use nom::multi::many0;
use nom::sequence::{delimited, terminated};
use nom::IResult;

#[derive(PartialEq, Debug, Clone)]
pub(in crate::dictionary) struct WordPrototype<'a> {
    pub(in crate::dictionary) kouho: &'a str,
    pub(in crate::dictionary) annotation: Option<&'a str>,
}

#[derive(PartialEq, Debug, Clone)]
pub(in crate::dictionary) struct DictEntryPrototype<'a> {
    pub(in crate::dictionary) midashi: &'a str,
    pub(in crate::dictionary) candidates: Vec<WordPrototype<'a>>,
}

/// 辞書のエントリを読む
/// "あい /愛/相/" のような一行。候補のない "あい /" も受け付ける。
pub(in crate::dictionary) fn entry(input: &str) -> IResult<&str, DictEntryPrototype> {
    let (i, midashi) = midashi(input)?;
    let (i, _) = take_while1(|c| c == ' ')(i)?;
    let (i, _) = char('/')(i)?;
    let (i, candidates) = many0(candidate)(i)?;
    let (i, _) = opt(char('/'))(i)?;
    let (i, _) = space0(i)?;
    let (i, _) = eof(i)?;

    Ok((
        i,
        DictEntryPrototype {
            midashi,
            candidates: candidates.into_iter().flatten().collect(),
        },
    ))
}

fn midashi(input: &str) -> IResult<&str, &str> {
    take_till1(|c: char| c == ' ')(input)
}

/// 先頭の'/'を読んだ後の"候補/"一つ分。
/// 厳密な送り仮名の"[く/悪/]/"は読み飛ばしてNoneを返す。
fn candidate(input: &str) -> IResult<&str, Option<WordPrototype>> {
    alt((
        map(strict_okuri_block, |_| None),
        map(terminated(kouho_with_annotation, char('/')), Some),
    ))(input)
}

fn strict_okuri_block(input: &str) -> IResult<&str, &str> {
    terminated(delimited(char('['), take_until("]"), char(']')), char('/'))(input)
}

/// '/'までの候補部分を";"で候補と注釈に分ける
fn kouho_with_annotation(input: &str) -> IResult<&str, WordPrototype> {
    let (i, cand) = verify(take_till1(|c: char| c == '/'), |s: &str| {
        !s.starts_with(';')
    })(input)?;
    let prototype = match cand.split_once(';') {
        Some((kouho, annotation)) => WordPrototype {
            kouho,
            annotation: Some(annotation),
        },
        None => WordPrototype {
            kouho: cand,
            annotation: None,
        },
    };
    Ok((i, prototype))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn basic_midashi() {
        let (_i, result) = midashi("ほげr ////").unwrap();
        assert_eq!(result, "ほげr");
    }

    #[test]
    fn basic_entry() {
        let (rest, result) = entry("あい /愛;love/相/").unwrap();
        assert_eq!(rest, "");
        assert_eq!(result.midashi, "あい");
        assert_eq!(
            result.candidates,
            vec![
                WordPrototype {
                    kouho: "愛",
                    annotation: Some("love"),
                },
                WordPrototype {
                    kouho: "相",
                    annotation: None,
                },
            ]
        );
    }

    #[test]
    fn strict_okuri_is_skipped() {
        let (_, result) = entry("うつt /打/[つ/打;hit/討/]/討/").unwrap();
        assert_eq!(
            result.candidates,
            vec![
                WordPrototype {
                    kouho: "打",
                    annotation: None,
                },
                WordPrototype {
                    kouho: "討",
                    annotation: None,
                },
            ]
        );
    }

    #[test]
    fn empty_candidates() {
        let (_, result) = entry("あい /").unwrap();
        assert!(result.candidates.is_empty());
        let (_, result) = entry("あい //").unwrap();
        assert!(result.candidates.is_empty());
    }

    #[test]
    fn annotation_with_space() {
        let (_, result) = entry("おくr /贈;(present) 賞を贈る/遅/").unwrap();
        assert_eq!(Some("(present) 賞を贈る"), result.candidates[0].annotation);
        assert_eq!("遅", result.candidates[1].kouho);
    }

    #[test]
    fn broken_entries() {
        assert!(entry("あい").is_err());
        assert!(entry("あい 愛/").is_err());
        assert!(entry("あい /愛").is_err());
    }
}
