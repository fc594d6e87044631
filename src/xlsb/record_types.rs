//! Record type vocabularies of the XLSB record stream.
//!
//! The primary namespace ([`BinaryRecordType`]) is always active. Inside a
//! future-record (`BrtFRTBegin`..`BrtFRTEnd`) or alternate-content
//! (`BrtACBegin`..`BrtACEnd`) block, codes that miss the primary namespace
//! belong to the block's own namespace, so the same raw integer can name
//! different records depending on where it appears. [`RecordType`] carries
//! the namespace alongside the code.
//!
//! Reference: [MS-XLSB] 2.3.2 Record Enumeration

use std::fmt;

macro_rules! binary_record_types {
    ($($name:ident = $code:literal,)+) => {
        /// Record types of the primary (always active) namespace.
        ///
        /// Most entries are enumerated for identification only; the
        /// structural readers in this crate decode a small subset.
        #[allow(clippy::upper_case_acronyms)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum BinaryRecordType {
            $($name,)+
        }

        impl BinaryRecordType {
            /// Numeric code written to the stream.
            pub const fn code(self) -> u16 {
                match self {
                    $(Self::$name => $code,)+
                }
            }

            /// Look up a code in the primary namespace.
            pub const fn from_code(code: u16) -> Option<Self> {
                match code {
                    $($code => Some(Self::$name),)+
                    _ => None,
                }
            }

            /// Record name as used by [MS-XLSB] (`Brt` prefixed).
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$name => concat!("Brt", stringify!($name)),)+
                }
            }
        }
    };
}

// BrtDecoupledPivotCacheID shares code 2048 with BrtBeginDecoupledPivotCacheIDs;
// the begin marker is the one that resolves.
binary_record_types! {
    AbsPath15 = 2071,
    ACBegin = 37,
    ACEnd = 38,
    ActiveX = 644,
    AFilterDateGroupItem = 175,
    ArrFmla = 426,
    BeginActiveXControls = 643,
    BeginAFilter = 161,
    BeginAutoSortScope = 459,
    BeginBook = 131,
    BeginBookViews = 135,
    BeginBorders = 613,
    BeginBundleShs = 143,
    BeginCalcFeatures = 5095,
    BeginCellIgnoreECs = 648,
    BeginCellIgnoreECs14 = 1169,
    BeginCellSmartTag = 590,
    BeginCellSmartTags = 592,
    BeginCellStyleXFs = 626,
    BeginCellWatches = 605,
    BeginCellXFs = 617,
    BeginCFRule = 463,
    BeginCFRule14 = 1048,
    BeginColBrk = 394,
    BeginColInfos = 390,
    BeginColorPalette = 473,
    BeginColorScale = 469,
    BeginColorScale14 = 1157,
    BeginComment = 635,
    BeginCommentAuthors = 630,
    BeginCommentList = 633,
    BeginComments = 628,
    BeginConditionalFormatting = 461,
    BeginConditionalFormatting14 = 1046,
    BeginConditionalFormattings = 1135,
    BeginCRErrs = 608,
    BeginCsView = 141,
    BeginCsViews = 139,
    BeginCustomFilters = 172,
    BeginCustomFilters14 = 1178,
    BeginCustomRichFilters = 5086,
    BeginDatabar = 467,
    BeginDatabar14 = 1051,
    BeginDataFeedPr15 = 2113,
    BeginDataModel = 2121,
    BeginDbTables15 = 2118,
    BeginDCon = 495,
    BeginDecoupledPivotCacheIDs = 2048,
    BeginDeletedName = 453,
    BeginDeletedNames = 451,
    BeginDim = 275,
    BeginDims = 273,
    BeginDRefs = 497,
    BeginDVals = 573,
    BeginDVals14 = 1054,
    BeginDxF14s = 1172,
    BeginDXFs = 505,
    BeginDXFs15 = 2103,
    BeginDynamicArrayPr = 4096,
    BeginECDbProps = 203,
    BeginECOlapProps = 205,
    BeginECParam = 267,
    BeginECParams = 265,
    BeginECTwFldInfo = 542,
    BeginECTwFldInfo15 = 2133,
    BeginECTWFldInfoLst = 540,
    BeginECTWFldInfoLst15 = 2131,
    BeginECTxtWiz = 538,
    BeginECTxtWiz15 = 2129,
    BeginECWebProps = 261,
    BeginEcWpTables = 263,
    BeginEsfmd = 339,
    BeginEsmdb = 337,
    BeginEsmdtinfo = 334,
    BeginEsmdx = 372,
    BeginEsstr = 380,
    BeginExtConn14 = 1068,
    BeginExtConn15 = 2109,
    BeginExtConnection = 201,
    BeginExtConnections = 429,
    BeginExternals = 353,
    BeginFills = 603,
    BeginFilterColumn = 163,
    BeginFilters = 165,
    BeginFmd = 52,
    BeginFmts = 615,
    BeginFnGroup = 664,
    BeginFonts = 611,
    BeginHeaderFooter = 479,
    BeginIconSet = 465,
    BeginIconSet14 = 1052,
    BeginPaletteColors = 565,
    BeginISXTHCols = 322,
    BeginISXTHRws = 320,
    BeginISXVDCols = 311,
    BeginISXVDRws = 309,
    BeginISXVIs = 388,
    BeginItemUniqueNames = 2106,
    BeginList = 343,
    BeginListCol = 347,
    BeginListCols = 345,
    BeginListParts = 660,
    BeginListXmlCPr = 349,
    BeginMap = 492,
    BeginMdx = 54,
    BeginMdxKPI = 378,
    BeginMdxMbrProp = 376,
    BeginMdxSet = 374,
    BeginMdxTuple = 56,
    BeginMergeCells = 177,
    BeginMetadata = 332,
    BeginMG = 490,
    BeginMGMaps = 488,
    BeginMgs = 486,
    BeginModelRelationships = 2126,
    BeginModelTables = 2123,
    BeginModelTimeGrouping = 2139,
    BeginModelTimeGroupings = 2137,
    BeginMRUColors = 569,
    BeginOledbPr15 = 2111,
    BeginOleObjects = 638,
    BeginPCD14 = 1066,
    BeginPCDCalcItem = 245,
    BeginPCDCalcItems = 243,
    BeginPCDCalcMem = 433,
    BeginPCDCalcMem14 = 1038,
    BeginPCDCalcMemExt = 1137,
    BeginPCDCalcMems = 431,
    BeginPCDCalcMemsExt = 1139,
    BeginPCDFAtbl = 189,
    BeginPCDFGDiscrete = 225,
    BeginPCDFGItems = 221,
    BeginPCDFGRange = 223,
    BeginPCDFGroup = 219,
    BeginPCDField = 183,
    BeginPCDFields = 181,
    BeginPCDHFieldsUsage = 199,
    BeginPCDHGLevel = 437,
    BeginPCDHGLevels = 435,
    BeginPCDHGLGMember = 445,
    BeginPCDHGLGMembers = 443,
    BeginPCDHGLGroup = 441,
    BeginPCDHGLGroups = 439,
    BeginPCDHierarchies = 195,
    BeginPCDHierarchy = 197,
    BeginPCDIRun = 191,
    BeginPCDKPI = 271,
    BeginPCDKPIs = 269,
    BeginPCDSConsol = 207,
    BeginPCDSCPage = 211,
    BeginPCDSCPages = 209,
    BeginPCDSCPItem = 213,
    BeginPCDSCSet = 217,
    BeginPCDSCSets = 215,
    BeginPCDSDTCEMember = 233,
    BeginPCDSDTCEMembers = 231,
    BeginPCDSDTCEMembersSortBy = 646,
    BeginPCDSDTCEntries = 229,
    BeginPCDSDTCQueries = 235,
    BeginPCDSDTCQuery = 237,
    BeginPCDSDTCSet = 241,
    BeginPCDSDTCSets = 239,
    BeginPCDSDTupleCache = 227,
    BeginPcdSFCIEntries = 657,
    BeginPCDSource = 185,
    BeginPCDSRange = 187,
    BeginPivotCacheDef = 179,
    BeginPivotCacheID = 386,
    BeginPivotCacheIDs = 384,
    BeginPivotCacheRecords = 193,
    BeginPivotTableRefs = 2051,
    BeginPivotTableUISettings = 2072,
    BeginPName = 255,
    BeginPNames = 253,
    BeginPNPair = 259,
    BeginPNPairs = 257,
    BeginPRFilter = 251,
    BeginPRFilter14 = 1165,
    BeginPRFilters = 249,
    BeginPRFilters14 = 1163,
    BeginPRFItem = 382,
    BeginPRFItem14 = 1167,
    BeginPRule = 247,
    BeginPRule14 = 1161,
    BeginQSI = 447,
    BeginQSIF = 457,
    BeginQSIFs = 455,
    BeginQSIR = 449,
    BeginRichFilterColumn = 5084,
    BeginRichFilters = 5081,
    BeginRichSortCondition = 5092,
    BeginRichValueBlock = 5002,
    BeginRRSort = 673,
    BeginRwBrk = 392,
    BeginScenMan = 500,
    BeginSct = 502,
    BeginSheet = 129,
    BeginSheetData = 145,
    BeginSingleCells = 341,
    BeginSlicer = 1083,
    BeginSlicerCache = 1075,
    BeginSlicerCacheDef = 1077,
    BeginSlicerCacheID = 1072,
    BeginSlicerCacheIDs = 1070,
    BeginSlicerCacheLevelData = 1090,
    BeginSlicerCacheLevelsData = 1088,
    BeginSlicerCacheNative = 1100,
    BeginSlicerCacheOlapImpl = 1086,
    BeginSlicerCacheSelections = 1097,
    BeginSlicerCacheSiRange = 1094,
    BeginSlicerCacheSiRanges = 1092,
    BeginSlicerCachesPivotCacheID = 1133,
    BeginSlicerCachesPivotCacheIDs = 1113,
    BeginSlicerEx = 1081,
    BeginSlicers = 1115,
    BeginSlicersEx = 1079,
    BeginSlicerStyle = 1128,
    BeginSlicerStyleElements = 1144,
    BeginSlicerStyles = 1142,
    BeginSmartTags = 594,
    BeginSmartTagTypes = 597,
    BeginSortCond = 532,
    BeginSortCond14 = 1152,
    BeginSortState = 530,
    BeginSparklineGroup = 1041,
    BeginSparklineGroups = 1058,
    BeginSparklines = 1056,
    BeginSst = 159,
    BeginStyles = 619,
    BeginStyleSheet = 278,
    BeginStyleSheetExt14 = 1131,
    BeginSupBook = 360,
    BeginSXChange = 1122,
    BeginSXChanges = 1124,
    BeginSXCondFmt = 558,
    BeginSXCondFmt14 = 1147,
    BeginSXCondFmts = 560,
    BeginSXCondFmts14 = 1149,
    BeginSXCrtFormat = 481,
    BeginSXCrtFormats = 483,
    BeginSXDI = 293,
    BeginSXDIs = 295,
    BeginSXEdit = 1118,
    BeginSXEdits = 1120,
    BeginSXFILTER = 601,
    BeginSXFilters = 599,
    BeginSXFormat = 303,
    BeginSXFormats = 305,
    BeginSXLI = 297,
    BeginSXLICols = 301,
    BeginSXLIRws = 299,
    BeginSXLocation = 314,
    BeginSXPI = 289,
    BeginSXPIs = 291,
    BeginSxRow = 2057,
    BeginSxrules = 641,
    BeginSxrules14 = 1159,
    BeginSxSelect = 307,
    BeginSXTDMP = 326,
    BeginSXTDMPS = 324,
    BeginSXTH = 318,
    BeginSXTHItem = 330,
    BeginSXTHItems = 328,
    BeginSXTHs = 316,
    BeginSXTupleSet = 1026,
    BeginSXTupleSetData = 1031,
    BeginSXTupleSetHeader = 1028,
    BeginSXTupleSetRow = 1033,
    BeginSxvcells = 2055,
    BeginSXVD = 285,
    BeginSXVDs = 287,
    BeginSXVI = 282,
    BeginSXView = 280,
    BeginSxView14 = 1062,
    BeginSXView16 = 1064,
    BeginSXVIs = 283,
    BeginTableSlicerCache = 2077,
    BeginTableStyle = 510,
    BeginTableStyles = 508,
    BeginTimelineCacheID = 2085,
    BeginTimelineCacheIDs = 2083,
    BeginTimelineCachePivotCacheIDs = 2080,
    BeginTimelineEx = 2089,
    BeginTimelinesEx = 2087,
    BeginTimelineStyle = 2093,
    BeginTimelineStyleElements = 2100,
    BeginTimelineStyles = 2098,
    BeginTimelineStylesheetExt15 = 2096,
    BeginUserCsView = 655,
    BeginUserCsViews = 653,
    BeginUsers = 401,
    BeginUserShView = 423,
    BeginUserShViews = 422,
    BeginVolDeps = 514,
    BeginVolMain = 518,
    BeginVolTopic = 520,
    BeginVolType = 516,
    BeginWebExtensions = 2068,
    BeginWebPubItem = 556,
    BeginWebPubItems = 554,
    BeginWsSortMap = 671,
    BeginWsView = 137,
    BeginWsViews = 133,
    BigName = 625,
    BkHim = 562,
    BookProtection = 534,
    BookProtectionIso = 677,
    BookView = 158,
    Border = 46,
    Brk = 396,
    BundleSh = 156,
    CalcFeature = 5097,
    CalcProp = 157,
    CellBlank = 1,
    CellBool = 4,
    CellError = 3,
    CellIgnoreEC = 649,
    CellIgnoreEC14 = 1105,
    CellIsst = 7,
    CellMeta = 49,
    CellReal = 5,
    CellRk = 2,
    CellRString = 62,
    CellSmartTagProperty = 589,
    CellSt = 6,
    CellWatch = 607,
    CFIcon = 1112,
    CFRuleExt = 1146,
    CFVO = 471,
    CFVO14 = 1050,
    ColInfo = 60,
    Color = 564,
    Color14 = 1055,
    ColorFilter = 168,
    CommentAuthor = 632,
    CommentText = 637,
    CrashRecErr = 610,
    CsPageSetup = 652,
    CsProp = 651,
    CsProtection = 669,
    CsProtectionIso = 679,
    CUsr = 399,
    CustomFilter = 174,
    CustomFilter14 = 1180,
    BRTCustomRichFilter = 5088,
    DbCommand15 = 2117,
    DbTable15 = 2120,
    Drawing = 550,
    DRef = 499,
    DVal = 64,
    DVal14 = 1053,
    DValList = 681,
    DXF = 507,
    DXF14 = 1171,
    DXF15 = 2102,
    DynamicFilter = 171,
    DynamicRichFilter = 5090,
    EndActiveXControls = 645,
    EndAFilter = 162,
    EndAutoSortScope = 460,
    EndBook = 132,
    EndBookViews = 136,
    EndBorders = 614,
    EndBundleShs = 144,
    EndCalcFeatures = 5096,
    EndCellIgnoreECs = 650,
    EndCellIgnoreECs14 = 1170,
    EndCellSmartTag = 591,
    EndCellSmartTags = 593,
    EndCellStyleXFs = 627,
    EndCellWatches = 606,
    EndCellXFs = 618,
    EndCFRule = 464,
    EndCFRule14 = 1049,
    EndColBrk = 395,
    EndColInfos = 391,
    EndColorPalette = 474,
    EndColorScale = 470,
    EndColorScale14 = 1158,
    EndComment = 636,
    EndCommentAuthors = 631,
    EndCommentList = 634,
    EndComments = 629,
    EndConditionalFormatting = 462,
    EndConditionalFormatting14 = 1047,
    EndConditionalFormattings = 1136,
    EndCRErrs = 609,
    EndCsView = 142,
    EndCsViews = 140,
    EndCustomFilters = 173,
    EndCustomRichFilters = 5087,
    EndDatabar = 468,
    EndDatabar14 = 1156,
    EndDataFeedPr15 = 2114,
    EndDataModel = 2122,
    EndDbTables15 = 2119,
    EndDCon = 496,
    EndDecoupledPivotCacheIDs = 2049,
    EndDeletedName = 454,
    EndDeletedNames = 452,
    EndDim = 276,
    EndDims = 274,
    EndDRefs = 498,
    EndDVals = 574,
    EndDVals14 = 1154,
    EndDxf14s = 1173,
    EndDXFs = 506,
    EndDXFs15 = 2104,
    EndDynamicArrayPr = 4097,
    EndECDbProps = 204,
    EndECOlapProps = 206,
    EndECParam = 268,
    EndECParams = 266,
    EndECTWFldInfoLst = 541,
    EndECTWFldInfoLst15 = 2132,
    EndECTxtWiz = 539,
    EndECTxtWiz15 = 2130,
    EndECWebProps = 262,
    EndECWPTables = 264,
    EndEsfmd = 340,
    EndEsmdb = 338,
    EndEsmdtinfo = 336,
    EndEsmdx = 373,
    EndEsstr = 381,
    EndExtConn14 = 1069,
    EndExtConn15 = 2110,
    EndExtConnection = 202,
    EndExtConnections = 430,
    EndExternals = 354,
    EndFills = 604,
    EndFilterColumn = 164,
    EndFilters = 166,
    EndFmd = 53,
    EndFmts = 616,
    EndFnGroup = 666,
    EndFonts = 612,
    EndHeaderFooter = 480,
    EndIconSet = 466,
    EndIconSet14 = 1155,
    EndPaletteColors = 566,
    EndISXTHCols = 323,
    EndISXTHRws = 321,
    EndISXVDCols = 312,
    EndISXVDRws = 310,
    EndISXVIs = 389,
    EndItemUniqueNames = 2107,
    EndList = 344,
    EndListCol = 348,
    EndListCols = 346,
    EndListParts = 662,
    EndListXmlCPr = 350,
    EndMap = 493,
    EndMdx = 55,
    EndMdxKPI = 379,
    EndMdxMbrProp = 377,
    EndMdxSet = 375,
    EndMdxTuple = 57,
    EndMergeCells = 178,
    EndMetadata = 333,
    EndMG = 491,
    EndMGMaps = 489,
    EndMGs = 487,
    EndModelRelationships = 2127,
    EndModelTables = 2124,
    EndModelTimeGrouping = 2140,
    EndModelTimeGroupings = 2138,
    EndMRUColors = 570,
    EndOledbPr15 = 2112,
    EndOleObjects = 640,
    EndPCD14 = 1067,
    EndPCDCalcItem = 246,
    EndPCDCalcItems = 244,
    EndPCDCalcMem = 434,
    EndPCDCalcMem14 = 1039,
    EndPCDCalcMemExt = 1138,
    EndPCDCalcMems = 432,
    EndPCDCalcMemsExt = 1140,
    EndPCDFAtbl = 190,
    EndPCDFGDiscrete = 226,
    EndPCDFGItems = 222,
    EndPCDFGRange = 224,
    EndPCDFGroup = 220,
    EndPCDField = 184,
    EndPCDFields = 182,
    EndPCDHFieldsUsage = 200,
    EndPCDHGLevel = 438,
    EndPCDHGLevels = 436,
    EndPCDHGLGMember = 446,
    EndPCDHGLGMembers = 444,
    EndPCDHGLGroup = 442,
    EndPCDHGLGroups = 440,
    EndPCDHierarchies = 196,
    EndPCDHierarchy = 198,
    EndPCDIRun = 192,
    EndPCDKPI = 272,
    EndPCDKPIs = 270,
    EndPCDSConsol = 208,
    EndPCDSCPage = 212,
    EndPCDSCPages = 210,
    EndPCDSCPItem = 214,
    EndPCDSCSet = 218,
    EndPCDSCSets = 216,
    EndPCDSDTCEMember = 234,
    EndPCDSDTCEMembers = 232,
    EndPCDSDTCEntries = 230,
    EndPCDSDTCQueries = 236,
    EndPCDSDTCQuery = 238,
    EndPCDSDTCSet = 242,
    EndPCDSDTCSets = 240,
    EndPCDSDTupleCache = 228,
    EndPCDSFCIEntries = 658,
    EndPCDSource = 186,
    EndPCDSRange = 188,
    EndPivotCacheDef = 180,
    EndPivotCacheID = 387,
    EndPivotCacheIDs = 385,
    EndPivotCacheRecords = 194,
    EndPivotTableRefs = 2052,
    EndPivotTableUISettings = 2073,
    EndPName = 256,
    EndPNames = 254,
    EndPNPair = 260,
    EndPNPairs = 258,
    EndPRFilter = 252,
    EndPRFilter14 = 1166,
    EndPRFilters = 250,
    EndPRFilters14 = 1164,
    EndPRFItem = 383,
    EndPRFItem14 = 1168,
    EndPRule = 248,
    EndPRule14 = 1162,
    EndQSI = 448,
    EndQSIF = 458,
    EndQSIFs = 456,
    EndQSIR = 450,
    EndRichFilterColumn = 5085,
    EndRichFilters = 5082,
    EndRichSortCondition = 5093,
    EndRichValueBlock = 5003,
    EndRRSort = 674,
    EndRwBrk = 393,
    EndScenMan = 501,
    EndSct = 503,
    EndSheet = 130,
    EndSheetData = 146,
    EndSingleCells = 342,
    EndSlicer = 1084,
    EndSlicerCache = 1076,
    EndSlicerCacheDef = 1078,
    EndSlicerCacheID = 1073,
    EndSlicerCacheIDs = 1071,
    EndSlicerCacheLevelData = 1091,
    EndSlicerCacheLevelsData = 1089,
    EndSlicerCacheNative = 1101,
    EndSlicerCacheOlapImpl = 1087,
    EndSlicerCacheSelections = 1099,
    EndSlicerCacheSiRange = 1095,
    EndSlicerCacheSiRanges = 1093,
    EndSlicerCachesPivotCacheID = 1134,
    EndSlicerCachesPivotCacheIDs = 1114,
    EndSlicerEx = 1082,
    EndSlicers = 1116,
    EndSlicersEx = 1080,
    EndSlicerStyle = 1129,
    EndSlicerStyleElements = 1145,
    EndSlicerStyles = 1143,
    EndSmartTags = 595,
    EndSmartTagTypes = 598,
    EndSortCond = 533,
    EndSortCond14 = 1153,
    EndSortState = 531,
    EndSparklineGroup = 1042,
    EndSparklineGroups = 1059,
    EndSparklines = 1057,
    EndSst = 160,
    EndStyles = 620,
    EndStyleSheet = 279,
    EndStyleSheetExt14 = 1132,
    EndSupBook = 588,
    EndSXChange = 1123,
    EndSXChanges = 1125,
    EndSXCondFmt = 559,
    EndSXCondFmt14 = 1148,
    EndSXCondFmts = 561,
    EndSXCondFmts14 = 1150,
    EndSXCrtFormat = 482,
    EndSXCrtFormats = 484,
    EndSXDI = 294,
    EndSXDIs = 296,
    EndSXEdit = 1119,
    EndSXEdits = 1121,
    EndSXFilter = 602,
    EndSXFilters = 600,
    EndSXFormat = 304,
    EndSxFormats = 306,
    EndSXLI = 298,
    EndSXLICols = 302,
    EndSXLIRws = 300,
    EndSXLocation = 313,
    EndSXPI = 290,
    EndSXPIs = 292,
    EndSxRow = 2058,
    EndSxRules = 642,
    EndSxrules14 = 1160,
    EndSxSelect = 308,
    EndSXTDMP = 327,
    EndSXTDMPs = 325,
    EndSXTH = 319,
    EndSXTHItem = 331,
    EndSXTHItems = 329,
    EndSXTHs = 317,
    EndSXTupleSet = 1027,
    EndSXTupleSetData = 1032,
    EndSXTupleSetHeader = 1029,
    EndSXTupleSetRow = 1034,
    EndSxvcells = 2056,
    EndSXVD = 286,
    EndSXVDs = 288,
    EndSXVI = 281,
    EndSXView = 315,
    EndSxView14 = 1063,
    EndSXView16 = 1065,
    EndSXVIs = 284,
    EndTableSlicerCache = 2078,
    EndTableStyle = 511,
    EndTableStyles = 509,
    EndTimelineCacheID = 2086,
    EndTimelineCacheIDs = 2084,
    EndTimelineCachePivotCacheIDs = 2081,
    EndTimelineEx = 2090,
    EndTimelinesEx = 2088,
    EndTimelineStyle = 2094,
    EndTimelineStyleElements = 2101,
    EndTimelineStyles = 2099,
    EndTimelineStylesheetExt15 = 2097,
    EndUserCsView = 656,
    EndUserCsViews = 654,
    EndUserShView = 424,
    EndUserShViews = 425,
    EndVolDeps = 515,
    EndVolMain = 519,
    EndVolTopic = 521,
    EndVolType = 517,
    EndWebExtensions = 2069,
    EndWebPubItem = 557,
    EndWebPubItems = 555,
    EndWsSortMap = 672,
    EndWsView = 138,
    EndWsViews = 134,
    EOF = 403,
    ExternalLinksPr = 5099,
    ExternCellBlank = 367,
    ExternCellBool = 369,
    ExternCellError = 370,
    ExternCellReal = 368,
    ExternCellString = 371,
    ExternRowHdr = 366,
    ExternSheet = 362,
    ExternTableEnd = 364,
    ExternTableStart = 363,
    ExternValueMeta = 472,
    FieldListActiveItem = 2134,
    FileRecover = 155,
    FileSharing = 548,
    FileSharingIso = 676,
    FileVersion = 128,
    Fill = 45,
    Filter = 167,
    Filter14 = 1177,
    FmlaBool = 10,
    FmlaError = 11,
    FmlaNum = 9,
    FmlaString = 8,
    Fmt = 44,
    FnGroup = 665,
    Font = 43,
    FRTBegin = 35,
    FRTEnd = 36,
    HLink = 494,
    IconFilter = 169,
    IconFilter14 = 1181,
    IndexBlock = 42,
    PaletteColor = 475,
    IndexPartEnd = 277,
    IndexRowBlock = 40,
    Info = 398,
    ItemUniqueName = 2108,
    KnownFonts = 1025,
    LegacyDrawing = 551,
    LegacyDrawingHF = 552,
    List14 = 1111,
    ListCCFmla = 351,
    ListPart = 661,
    ListTrFmla = 352,
    Margins = 476,
    Mdb = 51,
    Mdtinfo = 335,
    MdxMbrIstr = 58,
    MergeCell = 176,
    ModelRelationship = 2128,
    ModelTable = 2125,
    ModelTimeGroupingCalcCol = 2141,
    MRUColor = 572,
    Name = 39,
    NameExt = 1036,
    OleObject = 639,
    OleSize = 549,
    PageSetup = 478,
    Pane = 151,
    PCDCalcMem15 = 2060,
    PCDField14 = 1141,
    PCDH14 = 1037,
    PCDH15 = 2092,
    PCDIABoolean = 29,
    PCDIADatetime = 32,
    PCDIAError = 30,
    PCDIAMissing = 27,
    PCDIANumber = 28,
    PCDIAString = 31,
    PCDIBoolean = 22,
    PCDIDatetime = 25,
    PCDIError = 23,
    PCDIIndex = 26,
    PCDIMissing = 20,
    PCDINumber = 21,
    PCDIString = 24,
    PCDSFCIEntry = 659,
    PCRRecord = 33,
    PCRRecordDt = 34,
    PhoneticInfo = 537,
    PivotCacheConnectionName = 1182,
    PivotCacheIdVersion = 2135,
    PivotTableRef = 2053,
    PlaceholderName = 361,
    PrintOptions = 477,
    Qsi15 = 2067,
    RangePr15 = 2116,
    RangeProtection = 536,
    RangeProtection14 = 1103,
    RangeProtectionIso = 680,
    RangeProtectionIso14 = 1104,
    RevisionPtr = 3073,
    RichFilter = 5083,
    RichFilterDateGroupItem = 5094,
    RowHdr = 0,
    RRAutoFmt = 421,
    RRChgCell = 409,
    RRConflict = 417,
    RRDefName = 415,
    RREndChgCell = 410,
    RREndFormat = 420,
    RREndInsDel = 406,
    RREndMove = 408,
    RRFormat = 419,
    RRHeader = 411,
    RRInsDel = 405,
    RRInsertSh = 414,
    RRMove = 407,
    RRNote = 416,
    RRRenSheet = 413,
    RRSortItem = 675,
    RRTQSIF = 418,
    RRUserView = 412,
    RwDescent = 1024,
    Sel = 152,
    SheetCalcProp = 663,
    SheetProtection = 535,
    SheetProtectionIso = 678,
    ShrFmla = 427,
    Slc = 504,
    SlicerCacheBookPivotTables = 2054,
    SlicerCacheHideItemsWithNoData = 2105,
    SlicerCacheNativeItem = 1102,
    SlicerCacheOlapItem = 1096,
    SlicerCachePivotTables = 1085,
    SlicerCacheSelection = 1098,
    SlicerStyleElement = 1130,
    SmartTagType = 596,
    Sparkline = 1043,
    SSTItem = 19,
    Str = 59,
    Style = 48,
    SupAddin = 667,
    SupBookSrc = 355,
    SupNameBits = 586,
    SupNameBool = 584,
    SupNameEnd = 587,
    SupNameErr = 581,
    SupNameFmla = 585,
    SupNameNil = 583,
    SupNameNum = 580,
    SupNameSt = 582,
    SupNameStart = 577,
    SupNameValueEnd = 579,
    SupNameValueStart = 578,
    SupSame = 358,
    SupSelf = 357,
    SupTabs = 359,
    SXDI14 = 1044,
    SXDI15 = 2136,
    SxFilter15 = 2079,
    SXTDMPOrder = 668,
    SXTH14 = 1040,
    SXTupleItems = 1126,
    SXTupleSetHeaderItem = 1030,
    SXTupleSetRowItem = 1035,
    SxvcellBool = 67,
    SxvcellDate = 69,
    SxvcellErr = 68,
    SxvcellNil = 70,
    SxvcellNum = 65,
    SxvcellStr = 66,
    SXVD14 = 1061,
    Table = 428,
    TableSlicerCacheID = 2076,
    TableSlicerCacheIDs = 2075,
    TableStyleClient = 513,
    TableStyleElement = 512,
    TextPr15 = 2115,
    TimelineCachePivotCacheID = 2082,
    TimelineStyleElement = 2095,
    Top10Filter = 170,
    Top10RichFilter = 5089,
    UCR = 404,
    UserBookView = 397,
    Usr = 400,
    ValueMeta = 50,
    VolBool = 527,
    VolErr = 525,
    VolNum = 524,
    VolRef = 523,
    VolStr = 526,
    VolSubtopic = 522,
    WbFactoid = 154,
    WbProp = 153,
    WbProp14 = 1117,
    WebExtension = 2070,
    WebOpt = 553,
    WorkBookPr15 = 2091,
    WsDim = 148,
    WsFmtInfo = 485,
    WsFmtInfoEx14 = 1045,
    WsProp = 147,
    XF = 47,
    Uid = 3072,
}

impl fmt::Display for BinaryRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved record type together with the namespace it was resolved in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// Primary namespace record
    Primary(BinaryRecordType),
    /// Record inside a `BrtFRTBegin` block that is not in the primary namespace
    FutureRecord(u16),
    /// Record inside a `BrtACBegin` block that is not in the primary namespace
    AlternateContent(u16),
}

impl RecordType {
    /// Raw numeric code, regardless of namespace.
    pub const fn code(self) -> u16 {
        match self {
            RecordType::Primary(t) => t.code(),
            RecordType::FutureRecord(code) | RecordType::AlternateContent(code) => code,
        }
    }

    /// The primary record type, if this is one.
    pub const fn primary(self) -> Option<BinaryRecordType> {
        match self {
            RecordType::Primary(t) => Some(t),
            _ => None,
        }
    }

    /// Whether this is the given primary record type.
    #[inline]
    pub fn is(self, t: BinaryRecordType) -> bool {
        self == RecordType::Primary(t)
    }

    /// Whether this is any of the given primary record types.
    #[inline]
    pub fn is_any(self, types: &[BinaryRecordType]) -> bool {
        types.iter().any(|&t| self.is(t))
    }
}

impl From<BinaryRecordType> for RecordType {
    fn from(t: BinaryRecordType) -> Self {
        RecordType::Primary(t)
    }
}

impl PartialEq<BinaryRecordType> for RecordType {
    fn eq(&self, other: &BinaryRecordType) -> bool {
        self.is(*other)
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::Primary(t) => f.write_str(t.name()),
            RecordType::FutureRecord(code) => write!(f, "<FutureRecord> {}", code),
            RecordType::AlternateContent(code) => write!(f, "<AlternateContent> {}", code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_lookup_is_consistent() {
        for code in 0..=0x3FFFu16 {
            if let Some(t) = BinaryRecordType::from_code(code) {
                assert_eq!(t.code(), code, "{t}");
            }
        }
    }

    #[test]
    fn test_known_codes() {
        assert_eq!(BinaryRecordType::from_code(0x0081), Some(BinaryRecordType::BeginSheet));
        assert_eq!(BinaryRecordType::from_code(0x0094), Some(BinaryRecordType::WsDim));
        assert_eq!(BinaryRecordType::from_code(35), Some(BinaryRecordType::FRTBegin));
        assert_eq!(BinaryRecordType::from_code(37), Some(BinaryRecordType::ACBegin));
        assert_eq!(BinaryRecordType::from_code(3072), Some(BinaryRecordType::Uid));
        assert_eq!(
            BinaryRecordType::from_code(2048),
            Some(BinaryRecordType::BeginDecoupledPivotCacheIDs)
        );
        assert_eq!(BinaryRecordType::from_code(3000), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(RecordType::from(BinaryRecordType::SSTItem).to_string(), "BrtSSTItem");
        assert_eq!(RecordType::FutureRecord(3000).to_string(), "<FutureRecord> 3000");
        assert_eq!(
            RecordType::AlternateContent(3000).to_string(),
            "<AlternateContent> 3000"
        );
    }
}
