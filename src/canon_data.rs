//! Protestant 66-book canon with KJV versification.

use crate::canon::{BookRecord, Testament};

pub(crate) static STANDARD_BOOKS: [BookRecord; 66] = [
    BookRecord {
        name: "Genesis",
        abbreviation: "Gen",
        variants: &["Ge", "Gn"],
        testament: Testament::Old,
        verses: &[
            31, 25, 24, 26, 32, 22, 24, 22, 29, 32, 32, 20, 18, 24, 21, 16, 27, 33, 38, 18, 34,
            24, 20, 67, 34, 35, 46, 22, 35, 43, 55, 32, 20, 31, 29, 43, 36, 30, 23, 23, 57, 38,
            34, 34, 28, 34, 31, 22, 33, 26,
        ],
    },
    BookRecord {
        name: "Exodus",
        abbreviation: "Exod",
        variants: &["Ex", "Exo"],
        testament: Testament::Old,
        verses: &[
            22, 25, 22, 31, 23, 30, 25, 32, 35, 29, 10, 51, 22, 31, 27, 36, 16, 27, 25, 26, 36,
            31, 33, 18, 40, 37, 21, 43, 46, 38, 18, 35, 23, 35, 35, 38, 29, 31, 43, 38,
        ],
    },
    BookRecord {
        name: "Leviticus",
        abbreviation: "Lev",
        variants: &["Le", "Lv"],
        testament: Testament::Old,
        verses: &[
            17, 16, 17, 35, 19, 30, 38, 36, 24, 20, 47, 8, 59, 57, 33, 34, 16, 30, 37, 27, 24,
            33, 44, 23, 55, 46, 34,
        ],
    },
    BookRecord {
        name: "Numbers",
        abbreviation: "Num",
        variants: &["Nu", "Nm", "Nb"],
        testament: Testament::Old,
        verses: &[
            54, 34, 51, 49, 31, 27, 89, 26, 23, 36, 35, 16, 33, 45, 41, 50, 13, 32, 22, 29, 35,
            41, 30, 25, 18, 65, 23, 31, 40, 16, 54, 42, 56, 29, 34, 13,
        ],
    },
    BookRecord {
        name: "Deuteronomy",
        abbreviation: "Deut",
        variants: &["De", "Dt"],
        testament: Testament::Old,
        verses: &[
            46, 37, 29, 49, 33, 25, 26, 20, 29, 22, 32, 32, 18, 29, 23, 22, 20, 22, 21, 20, 23,
            30, 25, 22, 19, 19, 26, 68, 29, 20, 30, 52, 29, 12,
        ],
    },
    BookRecord {
        name: "Joshua",
        abbreviation: "Josh",
        variants: &["Jos", "Jsh"],
        testament: Testament::Old,
        verses: &[
            18, 24, 17, 24, 15, 27, 26, 35, 27, 43, 23, 24, 33, 15, 63, 10, 18, 28, 51, 9, 45,
            34, 16, 33,
        ],
    },
    BookRecord {
        name: "Judges",
        abbreviation: "Judg",
        variants: &["Jdg", "Jg", "Jdgs", "Jud"],
        testament: Testament::Old,
        verses: &[36, 23, 31, 24, 31, 40, 25, 35, 57, 18, 40, 15, 25, 20, 20, 31, 13, 31, 30, 48, 25],
    },
    BookRecord {
        name: "Ruth",
        abbreviation: "Ruth",
        variants: &["Rth", "Ru"],
        testament: Testament::Old,
        verses: &[22, 23, 18, 22],
    },
    BookRecord {
        name: "1 Samuel",
        abbreviation: "1Sam",
        variants: &["1Sa", "1Sm"],
        testament: Testament::Old,
        verses: &[
            28, 36, 21, 22, 12, 21, 17, 22, 27, 27, 15, 25, 23, 52, 35, 23, 58, 30, 24, 42, 15,
            23, 29, 22, 44, 25, 12, 25, 11, 31, 13,
        ],
    },
    BookRecord {
        name: "2 Samuel",
        abbreviation: "2Sam",
        variants: &["2Sa", "2Sm"],
        testament: Testament::Old,
        verses: &[
            27, 32, 39, 12, 25, 23, 29, 18, 13, 19, 27, 31, 39, 33, 37, 23, 29, 33, 43, 26, 22,
            51, 39, 25,
        ],
    },
    BookRecord {
        name: "1 Kings",
        abbreviation: "1Kgs",
        variants: &["1Ki", "1Kin", "1Kg"],
        testament: Testament::Old,
        verses: &[
            53, 46, 28, 34, 18, 38, 51, 66, 28, 29, 43, 33, 34, 31, 34, 34, 24, 46, 21, 43, 29,
            53,
        ],
    },
    BookRecord {
        name: "2 Kings",
        abbreviation: "2Kgs",
        variants: &["2Ki", "2Kin", "2Kg"],
        testament: Testament::Old,
        verses: &[
            18, 25, 27, 44, 27, 33, 20, 29, 37, 36, 21, 21, 25, 29, 38, 20, 41, 37, 37, 21, 26,
            20, 37, 20, 30,
        ],
    },
    BookRecord {
        name: "1 Chronicles",
        abbreviation: "1Chr",
        variants: &["1Ch", "1Chron"],
        testament: Testament::Old,
        verses: &[
            54, 55, 24, 43, 26, 81, 40, 40, 44, 14, 47, 40, 14, 17, 29, 43, 27, 17, 19, 8, 30,
            19, 32, 31, 31, 32, 34, 21, 30,
        ],
    },
    BookRecord {
        name: "2 Chronicles",
        abbreviation: "2Chr",
        variants: &["2Ch", "2Chron"],
        testament: Testament::Old,
        verses: &[
            17, 18, 17, 22, 14, 42, 22, 18, 31, 19, 23, 16, 22, 15, 19, 14, 19, 34, 11, 37, 20,
            12, 21, 27, 28, 23, 9, 27, 36, 27, 21, 33, 25, 33, 27, 23,
        ],
    },
    BookRecord {
        name: "Ezra",
        abbreviation: "Ezra",
        variants: &["Ezr", "Ez"],
        testament: Testament::Old,
        verses: &[11, 70, 13, 24, 17, 22, 28, 36, 15, 44],
    },
    BookRecord {
        name: "Nehemiah",
        abbreviation: "Neh",
        variants: &["Ne"],
        testament: Testament::Old,
        verses: &[11, 20, 32, 23, 19, 19, 73, 18, 38, 39, 36, 47, 31],
    },
    BookRecord {
        name: "Esther",
        abbreviation: "Esth",
        variants: &["Est"],
        testament: Testament::Old,
        verses: &[22, 23, 15, 17, 14, 14, 10, 17, 32, 3],
    },
    BookRecord {
        name: "Job",
        abbreviation: "Job",
        variants: &["Jb"],
        testament: Testament::Old,
        verses: &[
            22, 13, 26, 21, 27, 30, 21, 22, 35, 22, 20, 25, 28, 22, 35, 22, 16, 21, 29, 29, 34,
            30, 17, 25, 6, 14, 23, 28, 25, 31, 40, 22, 33, 37, 16, 33, 24, 41, 30, 24, 34, 17,
        ],
    },
    BookRecord {
        name: "Psalms",
        abbreviation: "Ps",
        variants: &["Psalm", "Pss", "Psa", "Psm"],
        testament: Testament::Old,
        verses: &[
            6, 12, 8, 8, 12, 10, 17, 9, 20, 18, 7, 8, 6, 7, 5, 11, 15, 50, 14, 9, 13, 31, 6, 10,
            22, 12, 14, 9, 11, 12, 24, 11, 22, 22, 28, 12, 40, 22, 13, 17, 13, 11, 5, 26, 17,
            11, 9, 14, 20, 23, 19, 9, 6, 7, 23, 13, 11, 11, 17, 12, 8, 12, 11, 10, 13, 20, 7,
            35, 36, 5, 24, 20, 28, 23, 10, 12, 20, 72, 13, 19, 16, 8, 18, 12, 13, 17, 7, 18, 52,
            17, 16, 15, 5, 23, 11, 13, 12, 9, 9, 5, 8, 28, 22, 35, 45, 48, 43, 13, 31, 7, 10,
            10, 9, 8, 18, 19, 2, 29, 176, 7, 8, 9, 4, 8, 5, 6, 5, 6, 8, 8, 3, 18, 3, 3, 21, 26,
            9, 8, 24, 13, 10, 7, 12, 15, 21, 10, 20, 14, 9, 6,
        ],
    },
    BookRecord {
        name: "Proverbs",
        abbreviation: "Prov",
        variants: &["Pr", "Prv"],
        testament: Testament::Old,
        verses: &[
            33, 22, 35, 27, 23, 35, 27, 36, 18, 32, 31, 28, 25, 35, 33, 33, 28, 24, 29, 30, 31,
            29, 35, 34, 28, 28, 27, 28, 27, 33, 31,
        ],
    },
    BookRecord {
        name: "Ecclesiastes",
        abbreviation: "Eccl",
        variants: &["Ecc", "Ec", "Eccles", "Qoh"],
        testament: Testament::Old,
        verses: &[18, 26, 22, 16, 20, 12, 29, 17, 18, 20, 10, 14],
    },
    BookRecord {
        name: "Song of Solomon",
        abbreviation: "Song",
        variants: &["Song of Songs", "SOS", "Canticles", "Cant"],
        testament: Testament::Old,
        verses: &[17, 17, 11, 16, 16, 13, 13, 14],
    },
    BookRecord {
        name: "Isaiah",
        abbreviation: "Isa",
        variants: &["Isai"],
        testament: Testament::Old,
        verses: &[
            31, 22, 26, 6, 30, 13, 25, 22, 21, 34, 16, 6, 22, 32, 9, 14, 14, 7, 25, 6, 17, 25,
            18, 23, 12, 21, 13, 29, 24, 33, 9, 20, 24, 17, 10, 22, 38, 22, 8, 31, 29, 25, 28,
            28, 25, 13, 15, 22, 26, 11, 23, 15, 12, 17, 13, 12, 21, 14, 21, 22, 11, 12, 19, 12,
            25, 24,
        ],
    },
    BookRecord {
        name: "Jeremiah",
        abbreviation: "Jer",
        variants: &["Je", "Jr"],
        testament: Testament::Old,
        verses: &[
            19, 37, 25, 31, 31, 30, 34, 22, 26, 25, 23, 17, 27, 22, 21, 21, 27, 23, 15, 18, 14,
            30, 40, 10, 38, 24, 22, 17, 32, 24, 40, 44, 26, 22, 19, 32, 21, 28, 18, 16, 18, 22,
            13, 30, 5, 28, 7, 47, 39, 46, 64, 34,
        ],
    },
    BookRecord {
        name: "Lamentations",
        abbreviation: "Lam",
        variants: &["La"],
        testament: Testament::Old,
        verses: &[22, 22, 66, 22, 22],
    },
    BookRecord {
        name: "Ezekiel",
        abbreviation: "Ezek",
        variants: &["Eze", "Ezk", "Ez"],
        testament: Testament::Old,
        verses: &[
            28, 10, 27, 17, 17, 14, 27, 18, 11, 22, 25, 28, 23, 23, 8, 63, 24, 32, 14, 49, 32,
            31, 49, 27, 17, 21, 36, 26, 21, 26, 18, 32, 33, 31, 15, 38, 28, 23, 29, 49, 26, 20,
            27, 31, 25, 24, 23, 35,
        ],
    },
    BookRecord {
        name: "Daniel",
        abbreviation: "Dan",
        variants: &["Da", "Dn"],
        testament: Testament::Old,
        verses: &[21, 49, 30, 37, 31, 28, 28, 27, 27, 21, 45, 13],
    },
    BookRecord {
        name: "Hosea",
        abbreviation: "Hos",
        variants: &["Hs"],
        testament: Testament::Old,
        verses: &[11, 23, 5, 19, 15, 11, 16, 14, 17, 15, 12, 14, 16, 9],
    },
    BookRecord {
        name: "Joel",
        abbreviation: "Joel",
        variants: &["Jl"],
        testament: Testament::Old,
        verses: &[20, 32, 21],
    },
    BookRecord {
        name: "Amos",
        abbreviation: "Amos",
        variants: &["Amo"],
        testament: Testament::Old,
        verses: &[15, 16, 15, 13, 27, 14, 17, 14, 15],
    },
    BookRecord {
        name: "Obadiah",
        abbreviation: "Obad",
        variants: &["Obd"],
        testament: Testament::Old,
        verses: &[21],
    },
    BookRecord {
        name: "Jonah",
        abbreviation: "Jonah",
        variants: &["Jnh"],
        testament: Testament::Old,
        verses: &[17, 10, 10, 11],
    },
    BookRecord {
        name: "Micah",
        abbreviation: "Mic",
        variants: &["Mc"],
        testament: Testament::Old,
        verses: &[16, 13, 12, 13, 15, 16, 20],
    },
    BookRecord {
        name: "Nahum",
        abbreviation: "Nah",
        variants: &["Na"],
        testament: Testament::Old,
        verses: &[15, 13, 19],
    },
    BookRecord {
        name: "Habakkuk",
        abbreviation: "Hab",
        variants: &["Hb"],
        testament: Testament::Old,
        verses: &[17, 20, 19],
    },
    BookRecord {
        name: "Zephaniah",
        abbreviation: "Zeph",
        variants: &["Zep", "Zp"],
        testament: Testament::Old,
        verses: &[18, 15, 20],
    },
    BookRecord {
        name: "Haggai",
        abbreviation: "Hag",
        variants: &["Hg"],
        testament: Testament::Old,
        verses: &[15, 23],
    },
    BookRecord {
        name: "Zechariah",
        abbreviation: "Zech",
        variants: &["Zec", "Zc"],
        testament: Testament::Old,
        verses: &[21, 13, 10, 14, 11, 15, 14, 23, 17, 12, 17, 14, 9, 21],
    },
    BookRecord {
        name: "Malachi",
        abbreviation: "Mal",
        variants: &["Ml"],
        testament: Testament::Old,
        verses: &[14, 17, 18, 6],
    },
    BookRecord {
        name: "Matthew",
        abbreviation: "Matt",
        variants: &["Mt"],
        testament: Testament::New,
        verses: &[
            25, 23, 17, 25, 48, 34, 29, 34, 38, 42, 30, 50, 58, 36, 39, 28, 27, 35, 30, 34, 46,
            46, 39, 51, 46, 75, 66, 20,
        ],
    },
    BookRecord {
        name: "Mark",
        abbreviation: "Mark",
        variants: &["Mk", "Mrk"],
        testament: Testament::New,
        verses: &[45, 28, 35, 41, 43, 56, 37, 38, 50, 52, 33, 44, 37, 72, 47, 20],
    },
    BookRecord {
        name: "Luke",
        abbreviation: "Luke",
        variants: &["Lk", "Luk"],
        testament: Testament::New,
        verses: &[
            80, 52, 38, 44, 39, 49, 50, 56, 62, 42, 54, 59, 35, 35, 32, 31, 37, 43, 48, 47, 38,
            71, 56, 53,
        ],
    },
    BookRecord {
        name: "John",
        abbreviation: "John",
        variants: &["Jn", "Jhn", "Joh"],
        testament: Testament::New,
        verses: &[51, 25, 36, 54, 47, 71, 53, 59, 41, 42, 57, 50, 38, 31, 27, 33, 26, 40, 42, 31, 25],
    },
    BookRecord {
        name: "Acts",
        abbreviation: "Acts",
        variants: &["Act"],
        testament: Testament::New,
        verses: &[
            26, 47, 26, 37, 42, 15, 60, 40, 43, 48, 30, 25, 52, 28, 41, 40, 34, 28, 41, 38, 40,
            30, 35, 27, 27, 32, 44, 31,
        ],
    },
    BookRecord {
        name: "Romans",
        abbreviation: "Rom",
        variants: &["Ro", "Rm"],
        testament: Testament::New,
        verses: &[32, 29, 31, 25, 21, 23, 25, 39, 33, 21, 36, 21, 14, 23, 33, 27],
    },
    BookRecord {
        name: "1 Corinthians",
        abbreviation: "1Cor",
        variants: &["1Co"],
        testament: Testament::New,
        verses: &[31, 16, 23, 21, 13, 20, 40, 13, 27, 33, 34, 31, 13, 40, 58, 24],
    },
    BookRecord {
        name: "2 Corinthians",
        abbreviation: "2Cor",
        variants: &["2Co"],
        testament: Testament::New,
        verses: &[24, 17, 18, 18, 21, 18, 16, 24, 15, 18, 33, 21, 14],
    },
    BookRecord {
        name: "Galatians",
        abbreviation: "Gal",
        variants: &["Ga"],
        testament: Testament::New,
        verses: &[24, 21, 29, 31, 26, 18],
    },
    BookRecord {
        name: "Ephesians",
        abbreviation: "Eph",
        variants: &["Ephes"],
        testament: Testament::New,
        verses: &[23, 22, 21, 32, 33, 24],
    },
    BookRecord {
        name: "Philippians",
        abbreviation: "Phil",
        variants: &["Php", "Pp", "Ph"],
        testament: Testament::New,
        verses: &[30, 30, 21, 23],
    },
    BookRecord {
        name: "Colossians",
        abbreviation: "Col",
        variants: &["Colo"],
        testament: Testament::New,
        verses: &[29, 23, 25, 18],
    },
    BookRecord {
        name: "1 Thessalonians",
        abbreviation: "1Thess",
        variants: &["1Th", "1Thes"],
        testament: Testament::New,
        verses: &[10, 20, 13, 18, 28],
    },
    BookRecord {
        name: "2 Thessalonians",
        abbreviation: "2Thess",
        variants: &["2Th", "2Thes"],
        testament: Testament::New,
        verses: &[12, 17, 18],
    },
    BookRecord {
        name: "1 Timothy",
        abbreviation: "1Tim",
        variants: &["1Ti", "1Tm"],
        testament: Testament::New,
        verses: &[20, 15, 16, 16, 25, 21],
    },
    BookRecord {
        name: "2 Timothy",
        abbreviation: "2Tim",
        variants: &["2Ti", "2Tm"],
        testament: Testament::New,
        verses: &[18, 26, 17, 22],
    },
    BookRecord {
        name: "Titus",
        abbreviation: "Titus",
        variants: &["Tit"],
        testament: Testament::New,
        verses: &[16, 15, 15],
    },
    BookRecord {
        name: "Philemon",
        abbreviation: "Phlm",
        variants: &["Philem", "Phm", "Ph"],
        testament: Testament::New,
        verses: &[25],
    },
    BookRecord {
        name: "Hebrews",
        abbreviation: "Heb",
        variants: &["Hebr"],
        testament: Testament::New,
        verses: &[14, 18, 19, 16, 14, 20, 28, 13, 28, 39, 40, 29, 25],
    },
    BookRecord {
        name: "James",
        abbreviation: "Jas",
        variants: &["Jm", "Jam"],
        testament: Testament::New,
        verses: &[27, 26, 18, 17, 20],
    },
    BookRecord {
        name: "1 Peter",
        abbreviation: "1Pet",
        variants: &["1Pe", "1Pt"],
        testament: Testament::New,
        verses: &[25, 25, 22, 19, 14],
    },
    BookRecord {
        name: "2 Peter",
        abbreviation: "2Pet",
        variants: &["2Pe", "2Pt"],
        testament: Testament::New,
        verses: &[21, 22, 18],
    },
    BookRecord {
        name: "1 John",
        abbreviation: "1John",
        variants: &["1Jn", "1Jo"],
        testament: Testament::New,
        verses: &[10, 29, 24, 21, 21],
    },
    BookRecord {
        name: "2 John",
        abbreviation: "2John",
        variants: &["2Jn", "2Jo"],
        testament: Testament::New,
        verses: &[13],
    },
    BookRecord {
        name: "3 John",
        abbreviation: "3John",
        variants: &["3Jn", "3Jo"],
        testament: Testament::New,
        verses: &[14],
    },
    BookRecord {
        name: "Jude",
        abbreviation: "Jude",
        variants: &["Jud", "Jd"],
        testament: Testament::New,
        verses: &[25],
    },
    BookRecord {
        name: "Revelation",
        abbreviation: "Rev",
        variants: &["Re", "Rv", "Revelations"],
        testament: Testament::New,
        verses: &[
            20, 29, 22, 11, 14, 17, 17, 13, 21, 11, 19, 17, 18, 20, 8, 21, 18, 24, 21, 15, 27,
            21,
        ],
    },
];
